//! # CLI Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PRINTHIRE_DB_PATH=/srv/printhire/printhire.db                      │
//! │     PRINTHIRE_LOG_LEVEL=debug                                          │
//! │     PRINTHIRE_MAX_CONNECTIONS=8                                        │
//! │                                                                         │
//! │  2. TOML Config File (--config, or the platform default)               │
//! │     ~/.config/printhire/printhire.toml (Linux)                         │
//! │     ~/Library/Application Support/com.printhire.printhire/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     database in the platform data dir, log level "info"                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/printhire/printhire.db"
//! max_connections = 5
//! busy_timeout_secs = 10
//!
//! [logging]
//! level = "info"   # any tracing EnvFilter directive
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use printhire_db::DbConfig;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// Where the database lives and how many connections to keep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a writer waits on a locked database before failing.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "printhire", "printhire")
        .map(|dirs| dirs.data_dir().join("printhire.db"))
        .unwrap_or_else(|| PathBuf::from("./printhire.db"))
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    10
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: default_log_level(),
        }
    }
}

// =============================================================================
// CliConfig
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl CliConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// An explicit `config_path` must exist; the platform default may be
    /// missing, in which case defaults are used.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
                debug!(?path, "Loaded config file");
            } else if explicit {
                return Err(ConfigError::Invalid(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.level must not be empty".into()));
        }

        Ok(())
    }

    /// Builds the pool configuration for [`printhire_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_secs(self.database.busy_timeout_secs))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("PRINTHIRE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(level) = lookup("PRINTHIRE_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(max) = lookup("PRINTHIRE_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring non-numeric PRINTHIRE_MAX_CONNECTIONS"),
            }
        }
    }

    /// Ensures the directory holding the database file exists.
    pub fn prepare_data_dir(&self) -> ConfigResult<()> {
        if let Some(parent) = self.database.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!(dir = %parent.display(), "Created data directory");
            }
        }
        Ok(())
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "printhire", "printhire")
            .map(|dirs| dirs.config_dir().join("printhire.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.busy_timeout_secs, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.database.path.ends_with("printhire.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: CliConfig = toml::from_str(
            r#"
            [database]
            path = "/tmp/stock.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/stock.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CliConfig::default();
        config.apply_overrides(lookup_from(&[
            ("PRINTHIRE_DB_PATH", "/srv/printhire.db"),
            ("PRINTHIRE_LOG_LEVEL", "printhire_db=debug"),
            ("PRINTHIRE_MAX_CONNECTIONS", "8"),
        ]));

        assert_eq!(config.database.path, PathBuf::from("/srv/printhire.db"));
        assert_eq!(config.logging.level, "printhire_db=debug");
        assert_eq!(config.database.max_connections, 8);
    }

    #[test]
    fn test_bad_max_connections_ignored() {
        let mut config = CliConfig::default();
        config.apply_overrides(lookup_from(&[("PRINTHIRE_MAX_CONNECTIONS", "many")]));
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_validation() {
        let mut config = CliConfig::default();
        config.database.max_connections = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = CliConfig::default();
        config.logging.level = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printhire.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"/data/printhire.db\"\nmax_connections = 3\n",
        )
        .unwrap();

        let config = CliConfig::load(Some(path)).unwrap();
        assert_eq!(config.database.max_connections, 3);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CliConfig::load(Some(dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printhire.toml");
        std::fs::write(&path, "[database\npath = 1").unwrap();

        assert!(matches!(CliConfig::load(Some(path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_db_config_carries_settings() {
        let mut config = CliConfig::default();
        config.database.path = PathBuf::from("/tmp/x.db");
        config.database.max_connections = 2;
        config.database.busy_timeout_secs = 3;

        let db = config.db_config();
        assert_eq!(db.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(db.max_connections, 2);
        assert_eq!(db.busy_timeout, Duration::from_secs(3));
    }
}
