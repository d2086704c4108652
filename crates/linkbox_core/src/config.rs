//! File + environment configuration for a linkbox session.
//!
//! # Invariants
//! - Every section defaults independently; a missing file is not an error.
//! - Environment overrides win over file values when non-empty.

use crate::logging::default_log_level;
use crate::model::note::DEFAULT_CONTENT;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

pub const ENV_DB_PATH: &str = "LINKBOX_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "LINKBOX_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LINKBOX_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "linkbox.sqlite3";
/// Length of the advisory `recent` list when not configured.
pub const DEFAULT_RECENT_LIMIT: usize = 20;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config io failure: {err}"),
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Serialize(err) => write!(f, "config cannot be serialized: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Which `RecordStore` backend a session opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// SQLite database file; ignored by the memory backend.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: DEFAULT_DB_FILE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files. File logging is off when unset.
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// Body shown for names that have never been saved.
    pub default_content: String,
    /// Length of the advisory `recent` list captured on save.
    pub recent_limit: usize,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            default_content: DEFAULT_CONTENT.to_string(),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkboxConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub notes: NotesConfig,
}

impl LinkboxConfig {
    /// Loads `path` (defaults when absent) and applies environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = match fs::read_to_string(path.as_ref()) {
            Ok(raw) => Self::from_toml_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(err.into()),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Applies non-empty values returned by `lookup` for the `LINKBOX_*` keys.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = non_empty(ENV_DB_PATH) {
            self.store.path = path;
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(dir) = non_empty(ENV_LOG_DIR) {
            self.logging.dir = Some(dir);
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, LinkboxConfig, StoreBackend, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL,
    };
    use crate::model::note::DEFAULT_CONTENT;

    #[test]
    fn missing_file_returns_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config =
            LinkboxConfig::load_from(dir.path().join("absent.toml")).expect("defaults load");
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.notes.default_content, DEFAULT_CONTENT);
        assert_eq!(config.notes.recent_limit, 20);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = LinkboxConfig::from_toml_str(
            "[store]\nbackend = \"memory\"\n\n[notes]\nrecent_limit = 5\n",
        )
        .expect("partial config should parse");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.path, "linkbox.sqlite3");
        assert_eq!(config.notes.recent_limit, 5);
        assert_eq!(config.notes.default_content, DEFAULT_CONTENT);
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = LinkboxConfig::from_toml_str("[store\nbackend = 1").expect_err("bad toml");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_apply_only_when_non_empty() {
        let mut config = LinkboxConfig::default();
        config.apply_overrides(|key| match key {
            ENV_DB_PATH => Some("/tmp/box.sqlite3".to_string()),
            ENV_LOG_LEVEL => Some("  ".to_string()),
            ENV_LOG_DIR => Some("/var/log/linkbox".to_string()),
            _ => None,
        });
        assert_eq!(config.store.path, "/tmp/box.sqlite3");
        assert_eq!(config.logging.level, LinkboxConfig::default().logging.level);
        assert_eq!(config.logging.dir.as_deref(), Some("/var/log/linkbox"));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("linkbox.toml");
        let mut config = LinkboxConfig::default();
        config.store.backend = StoreBackend::Memory;
        config.notes.recent_limit = 3;
        config.save_to(&path).expect("save config");

        let loaded = LinkboxConfig::from_toml_str(
            &std::fs::read_to_string(&path).expect("read config"),
        )
        .expect("parse saved config");
        assert_eq!(loaded, config);
    }
}
