//! SQLite persistence for bins.
//!
//! The pool is owned by whoever builds the service state and handed to the
//! query layer explicitly; there is no process-wide handle.

use std::ops::Deref;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use url::Url;

pub mod bin_queries;
pub mod models;

pub use bin_queries::BinStoreError;
pub use models::BinRecord;

/// How long a writer waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Deref for Database {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseSetupError {
    #[error("failed to create database directory: {0}")]
    Directory(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlx::Error),
    #[error("schema setup failed: {0}")]
    Schema(#[from] BinStoreError),
}

impl Database {
    /// Connect using a `sqlite://` URL and make sure the schema exists.
    ///
    /// `sqlite::memory:` is accepted and behaves like [`Database::in_memory`].
    pub async fn connect(url: &Url) -> Result<Self, DatabaseSetupError> {
        if url.as_str().contains(":memory:") {
            return Self::in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(url.as_str())?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        Self::with_options(options, MAX_CONNECTIONS).await
    }

    /// Open (or create) a file-backed database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseSetupError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let db = Self::with_options(options, MAX_CONNECTIONS).await?;
        tracing::info!("database initialized at {:?}", path);
        Ok(db)
    }

    /// Ephemeral database, lost when the last handle is dropped.
    ///
    /// Every `:memory:` connection is its own database, so the pool is pinned
    /// to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, DatabaseSetupError> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.ensure_schema().await?;

        tracing::info!("database initialized in-memory");
        Ok(db)
    }

    async fn with_options(
        options: SqliteConnectOptions,
        max_connections: u32,
    ) -> Result<Self, DatabaseSetupError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.ensure_schema().await?;
        Ok(db)
    }

    /// Cheap liveness check used by the readiness endpoint
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::in_memory().await.unwrap();
        db.ping().await.unwrap();
        assert_eq!(db.count_bins().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_connect_memory_url() {
        let url = Url::parse("sqlite::memory:").unwrap();
        let db = Database::connect(&url).await.unwrap();
        assert_eq!(db.count_bins().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("minibin.db");

        let db = Database::open(&path).await.unwrap();
        db.ping().await.unwrap();
        assert!(path.exists());
    }
}
