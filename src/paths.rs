//! Common paths for Parlor data storage
//!
//! All Parlor data is stored under ~/.config/parlor/ on all platforms:
//! - config.toml - User configuration
//! - session.enc - Encrypted session token

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the Parlor data directory (~/.config/parlor/)
///
/// This is consistent across all platforms for simplicity.
pub fn parlor_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let parlor_dir = home.join(".config").join("parlor");
    fs::create_dir_all(&parlor_dir).context("Failed to create parlor directory")?;
    Ok(parlor_dir)
}

/// Get the config file path (~/.config/parlor/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(parlor_dir()?.join("config.toml"))
}

/// Get the session file path (~/.config/parlor/session.enc)
pub fn session_path() -> Result<PathBuf> {
    Ok(parlor_dir()?.join("session.enc"))
}
