//! Runtime configuration for the personnel store.
//!
//! # Responsibility
//! - Describe where the database lives and how logging is set up.
//! - Normalize and validate raw values coming from flags or environment.
//!
//! # Invariants
//! - A validated config has a known log level.
//! - A configured log directory is absolute.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default database file name, relative to the working directory.
pub const DEFAULT_DB_FILE_NAME: &str = "personnel.sqlite3";
/// Database location value selecting an in-memory store.
pub const IN_MEMORY_DB: &str = ":memory:";

/// Database location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbLocation {
    File(PathBuf),
    InMemory,
}

impl DbLocation {
    /// Parses a raw location; `:memory:` selects the in-memory store.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyDbPath);
        }
        if trimmed == IN_MEMORY_DB {
            return Ok(Self::InMemory);
        }
        Ok(Self::File(PathBuf::from(trimmed)))
    }
}

impl Default for DbLocation {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_DB_FILE_NAME))
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub db: DbLocation,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db: DbLocation::default(),
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Builds a config from optional raw values, falling back to defaults.
    pub fn from_raw(
        db: Option<&str>,
        log_level: Option<&str>,
        log_dir: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            db: db.map(DbLocation::parse).transpose()?.unwrap_or(defaults.db),
            log_level: log_level.map_or(defaults.log_level, |value| value.trim().to_string()),
            log_dir: log_dir
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::logging::normalize_level(&self.log_level)
            .map_err(|_| ConfigError::UnknownLogLevel(self.log_level.clone()))?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        Ok(())
    }

    /// Database file path, when file-backed.
    pub fn db_path(&self) -> Option<&Path> {
        match &self.db {
            DbLocation::File(path) => Some(path.as_path()),
            DbLocation::InMemory => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDbPath,
    UnknownLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDbPath => write!(f, "database path cannot be empty"),
            Self::UnknownLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeLogDir(dir) => write!(
                f,
                "log directory must be an absolute path, got `{}`",
                dir.display()
            ),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, DbLocation, DEFAULT_DB_FILE_NAME};
    use std::path::PathBuf;

    #[test]
    fn defaults_point_at_local_file() {
        let config = AppConfig::from_raw(None, None, None).unwrap();
        assert_eq!(config.db, DbLocation::File(PathBuf::from(DEFAULT_DB_FILE_NAME)));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn memory_location_is_recognized() {
        let config = AppConfig::from_raw(Some(":memory:"), Some("WARN"), None).unwrap();
        assert_eq!(config.db, DbLocation::InMemory);
        assert!(config.db_path().is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            AppConfig::from_raw(Some("  "), None, None),
            Err(ConfigError::EmptyDbPath)
        );
        assert!(matches!(
            AppConfig::from_raw(None, Some("loud"), None),
            Err(ConfigError::UnknownLogLevel(_))
        ));
        assert!(matches!(
            AppConfig::from_raw(None, None, Some("logs/dev")),
            Err(ConfigError::RelativeLogDir(_))
        ));
    }
}
