//! Application configuration.
//!
//! The configuration is loaded from
//! `$XDG_CONFIG_HOME/niri-parity/config.json`.  Every key is optional; the
//! compiled-in defaults reproduce the built-in placement table and width
//! presets.
//!
//! # Example
//!
//! ```json
//! {
//!   "rules": [
//!     { "target": "firefox", "workspace": 1 },
//!     { "target": "spotify", "workspace": 9 }
//!   ],
//!   "home_target": "firefox",
//!   "home_workspace": 1,
//!   "width": {
//!     "presets": [0.33, 0.5, 0.66, 1.0],
//!     "preferred": 0.66,
//!     "toggle_tolerance": 0.05
//!   }
//! }
//! ```

use crate::placement::{default_rules, PlacementRule};
use crate::width::WidthConfig;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// Every field is optional: a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Placement rules applied by `Go`, in priority order (later wins).
    pub rules: Vec<PlacementRule>,

    /// Target brought to the front after `Go`.
    pub home_target: String,

    /// Workspace number (1-based) activated after `Go`.
    pub home_workspace: u32,

    /// Column width presets and fallbacks.
    pub width: WidthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            home_target: "Kenp".into(),
            home_workspace: 1,
            width: WidthConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Zero-based index of [`home_workspace`](Config::home_workspace).
    pub fn home_workspace_index(&self) -> usize {
        self.home_workspace.saturating_sub(1) as usize
    }
}

/// The user's home directory, from `$HOME` or the passwd entry.
///
/// Returns an empty string if neither is available; isolated browser
/// profiles are then not recognised.
pub fn home_dir() -> String {
    home_to_string(dirs::home_dir())
}

fn home_to_string(home: Option<PathBuf>) -> String {
    match home {
        Some(path) => path.to_string_lossy().into_owned(),
        None => {
            warn!("could not determine home directory, isolated browser profiles will not match");
            String::new()
        }
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
