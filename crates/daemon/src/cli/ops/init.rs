use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;

use minibin_daemon::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// HTTP server port
    #[arg(long, default_value = "8080")]
    pub port: u16,

    /// Database file (default: <minibin dir>/minibin.db)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Directory with the built web client to serve at /
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Log level for the service (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug)]
pub struct InitOutput {
    pub minibin_dir: PathBuf,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
    pub port: u16,
}

impl fmt::Display for InitOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} minibin at {}",
            "Initialized".green().bold(),
            self.minibin_dir.display()
        )?;
        writeln!(f, "  {} {}", "config:".dimmed(), self.config_path.display())?;
        writeln!(f, "  {} {}", "database:".dimmed(), self.db_path.display())?;
        write!(f, "  {} {}", "port:".dimmed(), self.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    State(#[from] StateError),
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = InitOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(InitError::InvalidLogLevel(self.log_level.clone()));
        }

        let config = AppConfig {
            port: self.port,
            db_path: self.db.clone(),
            static_dir: self.static_dir.clone(),
            log_level: self.log_level.clone(),
            ..AppConfig::default()
        };

        let state = AppState::init(ctx.config_path.clone(), config)?;

        Ok(InitOutput {
            minibin_dir: state.minibin_dir,
            config_path: state.config_path,
            db_path: state.db_path,
            port: state.config.port,
        })
    }
}
