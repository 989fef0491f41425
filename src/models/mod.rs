//! Data models for Parlor

mod post;
mod profile;

pub use post::{Author, Post};
pub use profile::Profile;
