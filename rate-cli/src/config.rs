//! TOML settings for the `kolibri-rates` binary.
//!
//! Values come from, in increasing priority: built-in defaults, the config
//! file (`--config`, else `./kolibri-rates.toml` when present), and
//! command-line flags.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "sqlite:rates.db?mode=rwc"
//!
//! [account]
//! id = 1
//!
//! [logging]
//! level = "info"
//! file = "kolibri-rates.log"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rate_core::AccountId;
use rate_core::db::DbConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Config file picked up from the working directory when `--config` is not
/// given.
pub const DEFAULT_CONFIG_FILE: &str = "kolibri-rates.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub account: AccountSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_backend")]
    pub backend: String,
    #[serde(default = "DatabaseSettings::default_connection_string")]
    pub connection_string: String,
}

impl DatabaseSettings {
    fn default_backend() -> String {
        "sqlite".into()
    }

    fn default_connection_string() -> String {
        "sqlite:rates.db?mode=rwc".into()
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: Self::default_backend(),
            connection_string: Self::default_connection_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSettings {
    #[serde(default = "AccountSettings::default_id")]
    pub id: i64,
}

impl AccountSettings {
    fn default_id() -> i64 {
        1
    }
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            id: Self::default_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Bare level or any `EnvFilter` directive.
    #[serde(default = "LoggingSettings::default_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingSettings {
    fn default_level() -> String {
        "info".into()
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            file: None,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub backend: Option<String>,
    pub connection_string: Option<String>,
    pub account: Option<i64>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Reads settings from `path`, or from [`DEFAULT_CONFIG_FILE`] when it
    /// exists, or falls back to defaults.
    ///
    /// An explicitly requested file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    debug!("no config file found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let settings =
            Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(settings)
    }

    pub fn apply_overrides(
        &mut self,
        overrides: Overrides,
    ) {
        if let Some(backend) = overrides.backend {
            self.database.backend = backend;
        }
        if let Some(connection_string) = overrides.connection_string {
            self.database.connection_string = connection_string;
        }
        if let Some(account) = overrides.account {
            self.account.id = account;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(file) = overrides.log_file {
            self.logging.file = Some(file);
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.database.backend.clone(),
            connection_string: self.database.connection_string.clone(),
        }
    }

    pub fn account_id(&self) -> AccountId {
        AccountId(self.account.id)
    }
}
