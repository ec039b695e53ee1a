use std::net::SocketAddr;
use std::path::PathBuf;

use common::short_id::ShortIdSpec;

use crate::bin_service::{DEFAULT_MAX_CONTENT_BYTES, DEFAULT_MAX_CREATE_ATTEMPTS};

pub const DEFAULT_PORT: u16 = 8080;

/// Everything the running service needs, resolved from config file and flags
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
    /// SQLite database file; `None` keeps everything in memory
    pub sqlite_path: Option<PathBuf>,
    /// Directory of prebuilt web client assets to serve at `/`
    pub static_dir: Option<PathBuf>,
    pub log_level: tracing::Level,
    /// When set, logs are also written to a daily-rotated file here
    pub log_dir: Option<PathBuf>,
    pub short_id: ShortIdSpec,
    pub max_create_attempts: u32,
    pub max_content_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            sqlite_path: None,
            static_dir: None,
            log_level: tracing::Level::INFO,
            log_dir: None,
            short_id: ShortIdSpec::default(),
            max_create_attempts: DEFAULT_MAX_CREATE_ATTEMPTS,
            max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
        }
    }
}
