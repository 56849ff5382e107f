use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use erdscope_introspect::{CacheOptions, IntrospectOptions};

pub const DEFAULT_CONFIG_PATH: &str = "erdscope.toml";
pub const DATABASE_URL_ENV: &str = "ERDSCOPE_DATABASE_URL";
pub const DATABASE_NAME_ENV: &str = "ERDSCOPE_DATABASE_NAME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    /// Database (MySQL) or schema (Postgres) to visualize.
    pub name: Option<String>,
    pub include_views: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let defaults = CacheOptions::default();
        Self {
            ttl_secs: defaults.ttl.as_secs(),
            capacity: defaults.capacity,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

impl Settings {
    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay values found through `lookup`, normally the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(DATABASE_URL_ENV) {
            self.database.url = Some(url);
        }
        if let Some(name) = lookup(DATABASE_NAME_ENV) {
            self.database.name = Some(name);
        }
    }

    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            ttl: Duration::from_secs(self.cache.ttl_secs),
            capacity: self.cache.capacity,
        }
    }

    pub fn introspect_options(&self) -> IntrospectOptions {
        IntrospectOptions {
            include_views: self.database.include_views,
        }
    }
}

/// Load settings from `path`, or from `erdscope.toml` in the working
/// directory. Only the default file may be absent.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    let mut settings = match std::fs::read_to_string(&path) {
        Ok(content) => Settings::from_toml(&path, &content)?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => Settings::default(),
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}
