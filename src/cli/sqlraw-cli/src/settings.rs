//! Settings file loading.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use sqlraw_auth::QueryConfig;
use sqlraw_storage_sqlite::SqliteConfig;

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// Settings file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or has unknown keys.
    #[error("invalid settings in {path}: {source}")]
    Parse {
        /// Settings file path.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// No database URL in the file nor on the command line.
    #[error("no database configured: set [database] url or pass --database-url")]
    MissingDatabase,
}

/// Contents of the settings file.
///
/// ```toml
/// [database]
/// url = "sqlite:/var/lib/sqlraw/users.db"
/// max_connections = 5
///
/// [queries]
/// get_password_hash_for_user = "SELECT hash FROM users WHERE name = :username"
/// user_exists = "SELECT 1 FROM users WHERE name = :username"
/// get_users = "SELECT name FROM users WHERE name LIKE :username ESCAPE '\\' ORDER BY name"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Database connection settings.
    pub database: Option<SqliteConfig>,
    /// Query templates.
    pub queries: QueryConfig,
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, SettingsError> {
        toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads settings from a file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Resolves the database settings, letting `url_override` win.
    pub fn database(&self, url_override: Option<&str>) -> Result<SqliteConfig, SettingsError> {
        match (url_override, &self.database) {
            (Some(url), Some(database)) => Ok(SqliteConfig {
                url: url.to_string(),
                ..database.clone()
            }),
            (Some(url), None) => Ok(SqliteConfig::new(url)),
            (None, Some(database)) => Ok(database.clone()),
            (None, None) => Err(SettingsError::MissingDatabase),
        }
    }
}
