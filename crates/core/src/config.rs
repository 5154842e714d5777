//! Application configuration.
//!
//! Values come from built-in defaults, then the optional TOML file returned
//! by [`config_path`], then `ODYSSEY_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::info;

const APP_DIR: &str = "odyssey-materials";

const DEFAULT_CONFIG: &str = r#"# Odyssey materials tracker configuration.
# Every key is optional; environment variables such as ODYSSEY_WATCHED_FOLDER
# take precedence over this file.

# Directory the game writes its journals and inventory snapshots to.
# watched_folder = "/home/commander/Saved Games/Frontier Developments/Elite Dangerous"

# JSON file holding favourites, wishlists and the preferred commander.
# preferences_path = "/home/commander/.config/odyssey-materials/preferences.json"

# shiplocker_file = "ShipLocker.json"
# backpack_file = "Backpack.json"

# Quiet period before a changed file is processed, in milliseconds.
# debounce_ms = 250

# Interval of the fallback size/mtime poll, in milliseconds.
# poll_interval_ms = 1000
"#;

/// Runtime configuration of the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Directory holding journals and snapshot files.
    pub watched_folder: PathBuf,
    /// Preference file location.
    pub preferences_path: PathBuf,
    /// File name of the ship locker snapshot.
    pub shiplocker_file: String,
    /// File name of the backpack snapshot.
    pub backpack_file: String,
    /// Debounce window for file changes.
    pub debounce_ms: u64,
    /// Poll interval for files the game holds open.
    pub poll_interval_ms: u64,
}

impl AppConfig {
    /// Load from the default config file location and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path().as_deref())
    }

    /// Load using `file` in place of the default config file.
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("watched_folder", path_string(default_watched_folder()))?
            .set_default("preferences_path", path_string(default_preferences_path()))?
            .set_default("shiplocker_file", "ShipLocker.json")?
            .set_default("backpack_file", "Backpack.json")?
            .set_default("debounce_ms", 250_i64)?
            .set_default("poll_interval_ms", 1000_i64)?;
        if let Some(file) = file {
            builder = builder.add_source(File::from(file).format(FileFormat::Toml).required(false));
        }
        let settings = builder
            .add_source(Environment::with_prefix("ODYSSEY").try_parsing(true))
            .build()
            .context("failed to read configuration")?;
        settings
            .try_deserialize()
            .context("invalid configuration")
    }
}

/// `<config dir>/odyssey-materials/config.toml`, if the platform has a
/// config directory.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Write a commented template to [`config_path`] unless a file exists.
pub fn ensure_default_config() -> Result<()> {
    let Some(path) = config_path() else {
        return Ok(());
    };
    write_default_config(&path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote default configuration to {}", path.display());
    Ok(())
}

fn default_watched_folder() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join("Saved Games")
        .join("Frontier Developments")
        .join("Elite Dangerous")
}

fn default_preferences_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_default()
        .join(APP_DIR)
        .join("preferences.json")
}

fn path_string(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}
