//! Configuration module for the feed engine

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::paths;

/// Feed engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the WordPress/BuddyPress site
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Number of activity records to request per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum age of offline cache entries before they are swept
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_hours: u64,
}

fn default_api_base_url() -> String {
    "https://shelfstack.app".to_string()
}

fn default_page_size() -> usize {
    20
}

fn default_request_timeout() -> u64 {
    30
}

fn default_cache_max_age() -> u64 {
    72
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout(),
            cache_max_age_hours: default_cache_max_age(),
        }
    }
}

impl FeedConfig {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        paths::config_path()
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = FeedConfig::default();
        config.api_base_url = "https://reads.example.com".to_string();
        config.page_size = 40;
        config.save_to(&path).unwrap();

        let loaded = FeedConfig::load_from(&path).unwrap();
        assert_eq!(loaded.api_base_url, "https://reads.example.com");
        assert_eq!(loaded.page_size, 40);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let config = FeedConfig::load_from(&path).unwrap();
        assert_eq!(config.page_size, 20);
    }
}
