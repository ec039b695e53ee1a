//! Create and read bins: id generation plus storage, with collision retry.

use std::sync::Arc;

use common::bin::Bin;
use common::short_id::{IdGenerator, ShortId};

use crate::database::{BinStoreError, Database};

/// Attempts per create before giving up on finding a free id
pub const DEFAULT_MAX_CREATE_ATTEMPTS: u32 = 5;

/// Upper bound on `content` length, in bytes
pub const DEFAULT_MAX_CONTENT_BYTES: usize = 10 * 1024 * 1024;

/// Result of a successful create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBin {
    pub id: ShortId,
    /// How many candidate ids were tried, 1 unless a collision occurred
    pub attempts: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateBinError {
    #[error("content is {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("no free id found after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error(transparent)]
    Store(#[from] BinStoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum GetBinError {
    /// Covers both ids that were never created and ids that could never
    /// have been generated, so callers cannot tell the two apart
    #[error("bin not found")]
    NotFound,
    #[error(transparent)]
    Store(BinStoreError),
}

impl From<BinStoreError> for GetBinError {
    fn from(err: BinStoreError) -> Self {
        match err {
            BinStoreError::NotFound(_) => GetBinError::NotFound,
            other => GetBinError::Store(other),
        }
    }
}

/// Composes an [`IdGenerator`] with the [`Database`].
///
/// Cheap to clone; clones share the pool and the generator.
#[derive(Clone)]
pub struct BinService {
    database: Database,
    ids: Arc<dyn IdGenerator>,
    max_create_attempts: u32,
    max_content_bytes: usize,
}

impl std::fmt::Debug for BinService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinService")
            .field("short_id", self.ids.spec())
            .field("max_create_attempts", &self.max_create_attempts)
            .field("max_content_bytes", &self.max_content_bytes)
            .finish()
    }
}

impl BinService {
    pub fn new(database: Database, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            database,
            ids,
            max_create_attempts: DEFAULT_MAX_CREATE_ATTEMPTS,
            max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
        }
    }

    /// At least one attempt is always made
    pub fn with_max_create_attempts(mut self, attempts: u32) -> Self {
        self.max_create_attempts = attempts.max(1);
        self
    }

    pub fn with_max_content_bytes(mut self, bytes: usize) -> Self {
        self.max_content_bytes = bytes;
        self
    }

    /* Getters */

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn id_generator(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    pub fn max_create_attempts(&self) -> u32 {
        self.max_create_attempts
    }

    pub fn max_content_bytes(&self) -> usize {
        self.max_content_bytes
    }

    /* Operations */

    /// Store `bin` under a freshly generated id.
    ///
    /// A collision regenerates the id and retries, up to
    /// `max_create_attempts` in total. Storage faults are returned as-is.
    pub async fn create(&self, bin: &Bin) -> Result<CreatedBin, CreateBinError> {
        let size = bin.content.len();
        if size > self.max_content_bytes {
            return Err(CreateBinError::TooLarge {
                size,
                limit: self.max_content_bytes,
            });
        }

        for attempt in 1..=self.max_create_attempts {
            let id = self.ids.generate();

            match self.database.create_bin(id.as_str(), bin).await {
                Ok(()) => {
                    tracing::info!(
                        id = %id,
                        attempt,
                        size,
                        encrypted = bin.is_encrypted(),
                        "bin created"
                    );
                    return Ok(CreatedBin {
                        id,
                        attempts: attempt,
                    });
                }
                Err(BinStoreError::Collision(_)) => {
                    tracing::warn!(id = %id, attempt, "short id collision, regenerating");
                }
                Err(e) => {
                    tracing::error!(id = %id, error = %e, "failed to store bin");
                    return Err(e.into());
                }
            }
        }

        tracing::error!(
            attempts = self.max_create_attempts,
            "exhausted id attempts while creating bin"
        );
        Err(CreateBinError::Exhausted {
            attempts: self.max_create_attempts,
        })
    }

    /// Fetch the bin stored under `id`.
    ///
    /// Ids that do not match the generator's shape are answered with
    /// `NotFound` without a storage round-trip.
    pub async fn get(&self, id: &str) -> Result<Bin, GetBinError> {
        if !self.ids.spec().is_well_formed(id) {
            tracing::debug!(id, "rejecting malformed bin id");
            return Err(GetBinError::NotFound);
        }

        match self.database.get_bin(id).await {
            Ok(record) => Ok(record.into_bin()),
            Err(e) => {
                if !e.is_not_found() {
                    tracing::error!(id, error = %e, "failed to load bin");
                }
                Err(e.into())
            }
        }
    }

    /// The stored content, for callers that treat it as a redirect target
    pub async fn redirect_target(&self, id: &str) -> Result<String, GetBinError> {
        self.get(id).await.map(|bin| bin.content)
    }
}
