//! Persisted user preferences.
//!
//! The state engine only needs a flat key/value store. [`FilePreferences`]
//! keeps it in a JSON object on disk; [`MemoryPreferences`] is used when
//! nothing should be persisted.

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::NamedTempFile;

/// Comma-joined favourite material ids.
pub const FAVOURITES: &str = "material.favourites";
/// Pre-commander wishlist, a comma-joined list of recipe ids.
pub const LEGACY_WISHLIST: &str = "wishlist.recipes";
/// Prefix of the per-commander wishlist key; the commander fid follows.
pub const WISHLIST_PREFIX: &str = "wishlist.recipes.";
/// Name of the commander shown by default.
pub const PREFERRED_COMMANDER: &str = "commander";
/// Token handed out by the trading network on enlistment.
pub const MARKETPLACE_TOKEN: &str = "marketplace.token";
/// Whether the commander plays in solo mode.
pub const SOLO_MODE: &str = "solo.mode";

/// Per-commander wishlist key.
pub fn wishlist_key(fid: &str) -> String {
    format!("{WISHLIST_PREFIX}{fid}")
}

/// Key/value preference storage.
pub trait PreferenceStore: Send + Sync {
    /// Current value for `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`.
    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    /// String value for `key`, or `default` when missing or not a string.
    fn get_string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(Value::String(value)) => value,
            _ => default.to_string(),
        }
    }

    /// Boolean value for `key`, or `default` when missing or not a boolean.
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|value| value.as_bool()).unwrap_or(default)
    }

    /// Convenience wrapper storing a string.
    fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.set(key, Value::String(value.to_string()))
    }
}

/// Preferences that live only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, Value>,
}

impl MemoryPreferences {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Preferences persisted as a JSON object, rewritten atomically on each set.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl FilePreferences {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read preferences {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("failed to parse preferences {}", path.display()))?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    fn persist(&self) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;

        let serialized =
            serde_json::to_vec_pretty(&self.values).context("failed to serialize preferences")?;
        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
        temp.write_all(&serialized)
            .context("failed to write preferences")?;
        temp.persist(&self.path)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn file_preferences_survive_reopen() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/preferences.json");

        let mut prefs = FilePreferences::open(&path)?;
        prefs.set_string(PREFERRED_COMMANDER, "Jameson")?;
        prefs.set("solo", json!(true))?;
        assert!(path.exists());

        let reopened = FilePreferences::open(&path)?;
        assert_eq!(reopened.get_string(PREFERRED_COMMANDER, ""), "Jameson");
        assert!(reopened.get_bool("solo", false));
        assert_eq!(reopened.get_string("missing", "fallback"), "fallback");
        Ok(())
    }

    #[test]
    fn wrong_types_fall_back_to_default() {
        let mut prefs = MemoryPreferences::new();
        prefs.set("flag", json!("yes")).expect("memory set");
        assert!(!prefs.get_bool("flag", false));
        assert_eq!(prefs.get_string("flag", "x"), "yes");
        assert_eq!(wishlist_key("F123"), "wishlist.recipes.F123");
    }
}
