use std::path::PathBuf;

use clap::Args;

use minibin_daemon::state::AppState;
use minibin_daemon::{spawn_service, ServiceError, StateError};

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// HTTP server port (overrides config.toml)
    #[arg(long, env = "MINIBIN_PORT")]
    pub port: Option<u16>,

    /// Path to the SQLite database file (overrides config.toml)
    #[arg(long, env = "MINIBIN_DB")]
    pub db: Option<PathBuf>,

    /// Directory with the built web client to serve at /
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Keep bins in memory only; nothing is written to disk
    #[arg(long, conflicts_with = "db")]
    pub ephemeral: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("state error: {0}")]
    StateError(#[from] StateError),

    #[error("service failed: {0}")]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // A missing config.toml is fine: flags and defaults cover everything
        let state = AppState::load_or_default(ctx.config_path.clone())?;
        let mut config = state.service_config()?;

        if let Some(port) = self.port {
            config.listen_addr.set_port(port);
        }
        if let Some(ref db) = self.db {
            config.sqlite_path = Some(db.clone());
        }
        if self.ephemeral {
            config.sqlite_path = None;
        }
        if let Some(ref dir) = self.static_dir {
            config.static_dir = Some(dir.clone());
        }

        spawn_service(&config).await?;
        Ok("minibin stopped".to_string())
    }
}
