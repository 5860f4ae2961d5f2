//! Editor settings, persisted as JSON in the user's home directory

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the home directory holding the editor's files
const CONFIG_DIR: &str = ".usd_prim_editor";
const CONFIG_FILE: &str = "config.json";

/// Behavioural settings of the prim editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Fetch children only when a row is expanded
    pub lazy_loading: bool,
    /// Expand rows down to `max_expanded_depth` after binding and refreshing
    pub auto_expand_tree: bool,
    pub max_expanded_depth: usize,
    /// Rows materialised between progress messages when loading eagerly
    pub max_items_per_batch: usize,
    /// Free-form settings for site customisation
    pub custom_settings: serde_json::Map<String, serde_json::Value>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            lazy_loading: true,
            auto_expand_tree: false,
            max_expanded_depth: 2,
            max_items_per_batch: 100,
            custom_settings: serde_json::Map::new(),
        }
    }
}

impl EditorConfig {
    /// `~/.usd_prim_editor/config.json`, if a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load settings from `path`
    ///
    /// A missing file yields the defaults. So does a file that cannot be
    /// read or parsed, after a warning.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(err) => {
                warn!("Ignoring config {}: {:#}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Load from the default location, or use the defaults
    pub fn load_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => {
                warn!("No home directory, using default config");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).context("Failed to read config")?;
        serde_json::from_str(&text).context("Failed to parse config")
    }

    /// Write settings as pretty JSON, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }
}
