#![forbid(unsafe_code)]

//! History configuration, optionally loaded from TOML or JSON.
//!
//! # Loading
//!
//! ```toml
//! # rewind.toml
//! max_undo_actions = 50   # -1 = unlimited, 0 = disabled
//! ```
//!
//! ```rust,ignore
//! let config = HistoryConfig::from_toml_file("rewind.toml")?;
//! let history = ActionHistory::from_config(&config)?;
//! ```
//!
//! File loading needs the `config` feature. Loaded configs are validated, so
//! a bad `max_undo_actions` surfaces as [`ConfigError::Limit`] at load time.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;
use crate::limit::{DEFAULT_MAX_UNDO_ACTIONS, UndoLimit};

/// Settings for an [`ActionHistory`](crate::ActionHistory).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct HistoryConfig {
    /// Raw history size: `-1` unlimited, `0` disabled, `n > 0` bounded.
    pub max_undo_actions: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo_actions: DEFAULT_MAX_UNDO_ACTIONS,
        }
    }
}

impl HistoryConfig {
    #[must_use]
    pub fn new(max_undo_actions: i64) -> Self {
        Self { max_undo_actions }
    }

    /// Never evict.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::new(UndoLimit::UNLIMITED_SENTINEL)
    }

    /// Run actions without recording them.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(UndoLimit::DISABLED_SENTINEL)
    }

    /// Decode `max_undo_actions`.
    ///
    /// # Errors
    ///
    /// [`HistoryError::InvalidLimit`] for an out-of-range value.
    pub fn undo_limit(&self) -> Result<UndoLimit, HistoryError> {
        UndoLimit::from_raw(self.max_undo_actions)
    }

    /// Validation messages; empty when the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Err(err) = self.undo_limit() {
            errors.push(format!("max_undo_actions: {err}"));
        }
        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(ConfigError::TomlSer)
    }

    #[cfg(feature = "config")]
    fn checked(self) -> Result<Self, ConfigError> {
        self.undo_limit().map_err(ConfigError::Limit)?;
        Ok(self)
    }
}

/// Errors from loading a [`HistoryConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// TOML serialization error.
    #[cfg(feature = "config")]
    TomlSer(toml::ser::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// `max_undo_actions` out of range.
    Limit(HistoryError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::TomlSer(e) => write!(f, "TOML serialize error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Limit(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::TomlSer(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Limit(e) => Some(e),
        }
    }
}
