//! Common paths for shelffeed data storage
//!
//! All shelffeed data is stored under ~/.config/shelffeed/ on all platforms:
//! - config.toml - Feed engine configuration
//! - shelffeed.sqlite - Offline activity cache

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the shelffeed data directory (~/.config/shelffeed/)
///
/// This is consistent across all platforms for simplicity.
pub fn shelffeed_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let dir = home.join(".config").join("shelffeed");
    fs::create_dir_all(&dir).context("Failed to create shelffeed directory")?;
    Ok(dir)
}

/// Get the config file path (~/.config/shelffeed/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(shelffeed_dir()?.join("config.toml"))
}

/// Get the cache database path (~/.config/shelffeed/shelffeed.sqlite)
pub fn cache_db_path() -> Result<PathBuf> {
    Ok(shelffeed_dir()?.join("shelffeed.sqlite"))
}
