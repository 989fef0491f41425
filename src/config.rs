//! Configuration module for Parlor

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::theme::Theme;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Plaza server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Number of posts to fetch per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Selected theme
    #[serde(default)]
    pub theme: Theme,
}

fn default_server_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_page_size() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            page_size: default_page_size(),
            theme: Theme::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        crate::paths::config_path()
    }

    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Server URL with any trailing slash removed
    pub fn server_base(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://localhost:8000");
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.server_url = "https://plaza.example.com".to_string();
        config.page_size = 50;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.server_url, "https://plaza.example.com");
        assert_eq!(loaded.page_size, 50);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.page_size, Config::default().page_size);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = 5\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.server_url, "http://localhost:8000");
    }

    #[test]
    fn test_server_base_strips_trailing_slash() {
        let mut config = Config::default();
        config.server_url = "https://plaza.example.com/".to_string();
        assert_eq!(config.server_base(), "https://plaza.example.com");
    }
}
