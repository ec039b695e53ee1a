use std::sync::Arc;

use common::short_id::{RandomIdGenerator, ShortIdSpecError};

use crate::bin_service::BinService;
use crate::database::{Database, DatabaseSetupError};
use crate::service_config::Config;

/// Shared handle passed to every request handler
#[derive(Debug, Clone)]
pub struct State {
    database: Database,
    bins: BinService,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup id generation, before anything touches disk
        let ids = RandomIdGenerator::new(config.short_id.clone())?;
        tracing::debug!(
            length = config.short_id.length,
            charset_len = config.short_id.charset.len(),
            "short id generator ready"
        );

        // 2. Setup database
        let database = match config.sqlite_path {
            Some(ref path) => Database::open(path).await?,
            None => {
                tracing::warn!("no database path configured, bins will not survive a restart");
                Database::in_memory().await?
            }
        };

        let bins = BinService::new(database.clone(), Arc::new(ids))
            .with_max_create_attempts(config.max_create_attempts)
            .with_max_content_bytes(config.max_content_bytes);

        Ok(Self::new(database, bins))
    }

    /// Assemble state from parts built elsewhere, e.g. a service with a
    /// scripted id generator
    pub fn new(database: Database, bins: BinService) -> Self {
        Self { database, bins }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn bins(&self) -> &BinService {
        &self.bins
    }
}

impl AsRef<Database> for State {
    fn as_ref(&self) -> &Database {
        self.database()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("database setup error: {0}")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("invalid short id configuration: {0}")]
    ShortId(#[from] ShortIdSpecError),
}
