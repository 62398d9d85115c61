//! Editor configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default number of undo steps kept per card.
pub const DEFAULT_HISTORY_DEPTH: usize = 30;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid config: {0}")]
    Parse(String),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables for the card editor and its transform controllers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Undo steps kept before the oldest is evicted.
    pub history_depth: usize,
    /// Smallest width a dimension resize may produce.
    pub min_width: f64,
    /// Smallest height a dimension resize may produce.
    pub min_height: f64,
    /// Smallest scale a scale resize may produce.
    pub min_scale: f64,
    /// Logical pixels of drag per unit of scale.
    pub scale_divisor: f64,
    /// Scale of the element's parent container.
    pub parent_scale: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            min_width: 10.0,
            min_height: 10.0,
            min_scale: 0.1,
            scale_divisor: 100.0,
            parent_scale: 1.0,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Write the config to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Io(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        fs::write(path, self.to_json()?)
            .map_err(|e| ConfigError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Default config path.
    ///
    /// On Unix: `~/.local/share/cardsmith/config.json`
    /// On Windows: `%LOCALAPPDATA%\cardsmith\config.json`
    pub fn default_location() -> Option<PathBuf> {
        dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .map(|base| base.join("cardsmith").join("config.json"))
    }

    /// Load the config from the default location, falling back to defaults
    /// when it is missing or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_location() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.history_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "historyDepth",
                reason: "must be at least 1".to_string(),
            });
        }
        let positive = [
            ("minWidth", self.min_width),
            ("minHeight", self.min_height),
            ("minScale", self.min_scale),
            ("scaleDivisor", self.scale_divisor),
            ("parentScale", self.parent_scale),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {}", value),
                });
            }
        }
        Ok(())
    }
}
