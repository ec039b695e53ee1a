//! On-disk application state: the minibin directory and its `config.toml`.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use common::short_id::ShortIdSpec;

use crate::bin_service::{DEFAULT_MAX_CONTENT_BYTES, DEFAULT_MAX_CREATE_ATTEMPTS};
use crate::service_config::{Config as ServiceConfig, DEFAULT_PORT};

pub const APP_DIR_NAME: &str = ".minibin";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "minibin.db";

/// Persisted configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub listen_host: String,
    pub port: u16,
    /// Database file; defaults to `minibin.db` inside the minibin directory
    pub db_path: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub short_id: ShortIdSpec,
    pub max_create_attempts: u32,
    pub max_content_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            db_path: None,
            static_dir: None,
            log_level: "info".to_string(),
            log_dir: None,
            short_id: ShortIdSpec::default(),
            max_create_attempts: DEFAULT_MAX_CREATE_ATTEMPTS,
            max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub minibin_dir: PathBuf,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
    pub config: AppConfig,
}

impl AppState {
    /// `~/.minibin`
    pub fn default_dir() -> Result<PathBuf, StateError> {
        dirs::home_dir()
            .map(|home| home.join(APP_DIR_NAME))
            .ok_or(StateError::NoHomeDirectory)
    }

    /// Create the minibin directory and write `config` into it.
    ///
    /// Refuses to overwrite an existing config file.
    pub fn init(dir: Option<PathBuf>, config: AppConfig) -> Result<Self, StateError> {
        let minibin_dir = Self::resolve_dir(dir)?;
        let config_path = minibin_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            return Err(StateError::AlreadyInitialized(minibin_dir));
        }

        std::fs::create_dir_all(&minibin_dir)?;
        let serialized = toml::to_string_pretty(&config)?;
        std::fs::write(&config_path, serialized)?;

        tracing::info!("initialized minibin directory at {:?}", minibin_dir);
        Ok(Self::from_parts(minibin_dir, config_path, config))
    }

    /// Load an initialized minibin directory
    pub fn load(dir: Option<PathBuf>) -> Result<Self, StateError> {
        let minibin_dir = Self::resolve_dir(dir)?;
        let config_path = minibin_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(StateError::NotInitialized(minibin_dir));
        }

        let config = Self::read_config(&config_path)?;
        Ok(Self::from_parts(minibin_dir, config_path, config))
    }

    /// Like [`AppState::load`], but fall back to defaults when no config
    /// file exists, so `serve` works without running `init` first
    pub fn load_or_default(dir: Option<PathBuf>) -> Result<Self, StateError> {
        match Self::load(dir.clone()) {
            Err(StateError::NotInitialized(minibin_dir)) => {
                tracing::debug!("no config at {:?}, using defaults", minibin_dir);
                let config_path = minibin_dir.join(CONFIG_FILE_NAME);
                Ok(Self::from_parts(minibin_dir, config_path, AppConfig::default()))
            }
            other => other,
        }
    }

    /// Resolve the persisted config into what the service runs with
    pub fn service_config(&self) -> Result<ServiceConfig, StateError> {
        let host = IpAddr::from_str(&self.config.listen_host)
            .map_err(|_| StateError::InvalidListenHost(self.config.listen_host.clone()))?;
        let log_level = tracing::Level::from_str(&self.config.log_level)
            .map_err(|_| StateError::InvalidLogLevel(self.config.log_level.clone()))?;

        Ok(ServiceConfig {
            listen_addr: SocketAddr::new(host, self.config.port),
            sqlite_path: Some(self.db_path.clone()),
            static_dir: self.config.static_dir.clone(),
            log_level,
            log_dir: self.config.log_dir.clone(),
            short_id: self.config.short_id.clone(),
            max_create_attempts: self.config.max_create_attempts,
            max_content_bytes: self.config.max_content_bytes,
        })
    }

    fn resolve_dir(dir: Option<PathBuf>) -> Result<PathBuf, StateError> {
        match dir {
            Some(dir) => Ok(dir),
            None => Self::default_dir(),
        }
    }

    fn read_config(path: &Path) -> Result<AppConfig, StateError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    fn from_parts(minibin_dir: PathBuf, config_path: PathBuf, config: AppConfig) -> Self {
        let db_path = config
            .db_path
            .clone()
            .unwrap_or_else(|| minibin_dir.join(DB_FILE_NAME));

        Self {
            minibin_dir,
            config_path,
            db_path,
            config,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not determine the home directory")]
    NoHomeDirectory,
    #[error("minibin is already initialized at {0:?}")]
    AlreadyInitialized(PathBuf),
    #[error("minibin is not initialized at {0:?}, run `minibin init` first")]
    NotInitialized(PathBuf),
    #[error("invalid listen host: {0}")]
    InvalidListenHost(String),
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("failed to write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}
