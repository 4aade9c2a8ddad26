use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "BOOKSTORE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid public_url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("database.pool_size must be at least 1")]
    InvalidPoolSize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub listen_addr: String,
    /// Externally visible base URL, advertised by the health endpoint
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".to_string(),
            public_url: "http://localhost:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,
    /// Maximum number of pooled connections
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("bookstore.db"),
            pool_size: 8,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// Reads the YAML file named by `BOOKSTORE_CONFIG` when set, then applies
    /// `LISTEN`, `DATABASE_PATH` and `PUBLIC_URL` overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an explicit variable lookup.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(listen) = lookup("LISTEN") {
            cfg.server.listen_addr = listen;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            cfg.database.path = PathBuf::from(path);
        }
        if let Some(url) = lookup("PUBLIC_URL") {
            cfg.server.public_url = url;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.server.public_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.server.public_url.clone(),
            source,
        })?;

        if self.database.pool_size == 0 {
            return Err(ConfigError::InvalidPoolSize);
        }

        Ok(())
    }

    /// Collection URL advertised as `apiURL` by the health endpoint.
    pub fn api_url(&self) -> String {
        format!(
            "{}/api/v1/books",
            self.server.public_url.trim_end_matches('/')
        )
    }
}
