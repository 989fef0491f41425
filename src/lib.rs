//! # Parlor 🛋️
//!
//! A cozy terminal client for Plaza social servers.
//!
//! ## Overview
//!
//! Parlor lets you browse the feed, visit profiles, post, like, and follow
//! on any Plaza server from your terminal. Log in once and the session is
//! kept encrypted on disk until you log out.
//!
//! ## Architecture
//!
//! A synchronous terminal event loop owns all screen state; one background
//! tokio task owns the HTTP client. They talk over a pair of channels:
//!
//! ```text
//!  ┌───────────────────────────┐    AsyncCommand     ┌───────────────────────┐
//!  │ event loop (main thread)  │ ──────────────────► │ worker task (tokio)   │
//!  │ draw + poll keys + apply  │                     │ one PlazaClient,      │
//!  │ results to AppState       │ ◄────────────────── │ requests in sequence  │
//!  └───────────────────────────┘    AsyncResult      └───────────────────────┘
//! ```
//!
//! Mutations never patch rendered data. A successful like, delete, create,
//! follow, or profile edit comes back as a result that chains into a fresh
//! `LoadFeed`/`LoadProfile` command, and the reload replaces the screen's
//! list wholesale.
//!
//! ## Modules
//!
//! - [`api`] — typed client for the Plaza REST API and its error taxonomy
//! - [`app`] — event loop, screen state, key handling, rendering
//! - [`config`] — TOML config file (server URL, page size, theme)
//! - [`images`] — inline terminal images: decode, cache, protocol picker
//! - [`models`] — what the screens render: [`Post`], [`Author`], [`Profile`]
//! - [`paths`] — well-known file locations under the user config dir
//! - [`session`] — encrypted on-disk session store
//! - [`theme`] — color schemes
//!
//! ## Example
//!
//! ```no_run
//! use parlor::app;
//!
//! fn main() -> anyhow::Result<()> {
//!     app::run(None)
//! }
//! ```
//!
//! ## Features
//!
//! - **Feed & Profiles** — Browse posts and people without leaving the terminal
//! - **Post with Images** — Compose posts with an optional image attachment
//! - **Hashtag Search** — Filter the feed by tag with `/`
//! - **Inline Images** — Pictures rendered right in the terminal
//! - **Secure** — Session token stored encrypted on disk
//! - **Honest** — every action reloads from the server, so what you see is
//!   what the server has

#![doc(html_root_url = "https://docs.rs/parlor/0.2.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::if_not_else)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::use_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::similar_names)]
#![allow(clippy::if_same_then_else)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::branches_sharing_code)]
#![allow(clippy::wrong_self_convention)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod app;
pub mod config;
pub mod images;
pub mod models;
pub mod paths;
pub mod session;
pub mod theme;

// Re-export main types for convenience
pub use api::{ApiError, PlazaClient};
pub use app::AppState;
pub use config::Config;
pub use models::{Author, Post, Profile};
pub use session::Session;
pub use theme::{Theme, ThemeColors};

// Re-export the theme name enum from ratatui-themes crate
pub use ratatui_themes::ThemeName;

/// ASCII logo for the application
pub const LOGO: &str = r"
                   __
   ___  ___ ______/ /__  ____
  / _ \/ _ `/ __/ / _ \/ __/
 / .__/\_,_/_/ /_/\___/_/
/_/
";

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Repository URL
pub const REPO_URL: &str = "https://github.com/parlor-tui/parlor";
