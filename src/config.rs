//! TOML configuration for the CLI and dashboard server.

use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::executor::sqlite::DEFAULT_BUSY_TIMEOUT;

/// Default bind port.
pub const DEFAULT_PORT: u16 = 7654;

/// Loaded configuration, with the file it came from (if any).
#[derive(Debug, Default)]
pub struct VistaConfig {
    path: Option<PathBuf>,
    data: RawConfig,
}

impl VistaConfig {
    /// Loads `explicit`, or the default location. A missing file yields defaults;
    /// an explicit path that does not exist is an error.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let data = read_file(&path)?;
            return Ok(Self {
                path: Some(path),
                data,
            });
        }
        let path = default_config_path();
        let data = match path.as_ref() {
            Some(config_path) if config_path.exists() => read_file(config_path)?,
            _ => RawConfig::default(),
        };
        Ok(Self { path, data })
    }

    /// Parses configuration text directly.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let data = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Ok(Self { path: None, data })
    }

    /// File the configuration was read from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Picks the CLI-supplied database, else the configured default.
    pub fn database(&self, cli: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        cli.or_else(|| self.data.database.default_path.clone())
            .ok_or(ConfigError::MissingDatabase)
    }

    /// SQLite busy timeout.
    pub fn busy_timeout(&self) -> Duration {
        self.data
            .database
            .busy_timeout_ms
            .map_or(DEFAULT_BUSY_TIMEOUT, Duration::from_millis)
    }

    /// Bind host.
    pub fn host(&self) -> IpAddr {
        self.data
            .server
            .host
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }

    /// Bind port.
    pub fn port(&self) -> u16 {
        self.data.server.port.unwrap_or(DEFAULT_PORT)
    }

    /// Static asset directory.
    pub fn assets(&self) -> Option<&Path> {
        self.data.server.assets.as_deref()
    }

    /// Allowed CORS origins.
    pub fn allow_origins(&self) -> &[String] {
        &self.data.server.allow_origins
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    database: DatabaseSection,
    #[serde(default)]
    server: ServerSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatabaseSection {
    #[serde(rename = "default")]
    default_path: Option<PathBuf>,
    busy_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerSection {
    host: Option<IpAddr>,
    port: Option<u16>,
    assets: Option<PathBuf>,
    #[serde(default)]
    allow_origins: Vec<String>,
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// No database path on the command line or in the config.
    #[error("no database given; pass a DB path or set [database] default in the config")]
    MissingDatabase,
}

/// `$CONFIG_DIR/vista/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("vista").join("config.toml"))
}
