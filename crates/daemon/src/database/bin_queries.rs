use common::bin::Bin;

use crate::database::{BinRecord, Database};

/// Failures of the bin store, split by what the caller can do about them
#[derive(Debug, thiserror::Error)]
pub enum BinStoreError {
    /// The id is already taken. Recoverable: pick a new id and try again.
    #[error("a bin with id {0} already exists")]
    Collision(String),
    /// No bin is stored under the id
    #[error("no bin with id {0}")]
    NotFound(String),
    /// Anything the storage layer itself failed on. Never retried here.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl BinStoreError {
    pub fn is_collision(&self) -> bool {
        matches!(self, BinStoreError::Collision(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BinStoreError::NotFound(_))
    }
}

impl Database {
    /// Create the `bins` table if it is missing. Never touches existing rows.
    pub async fn ensure_schema(&self) -> Result<(), BinStoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bins (
                id TEXT PRIMARY KEY,
                content TEXT,
                language TEXT,
                iv TEXT
            )
            "#,
        )
        .execute(&**self)
        .await?;

        Ok(())
    }

    /// Insert a new bin under `id`.
    ///
    /// A single INSERT, so the row is either fully written or absent. The
    /// primary key guarantees that of two concurrent inserts for the same id
    /// exactly one succeeds; the other gets [`BinStoreError::Collision`].
    pub async fn create_bin(&self, id: &str, bin: &Bin) -> Result<(), BinStoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO bins (id, content, language, iv)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(id)
        .bind(&bin.content)
        .bind(&bin.language)
        .bind(&bin.iv)
        .execute(&**self)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(BinStoreError::Collision(id.to_string()))
            }
            Err(e) => Err(BinStoreError::Storage(e)),
        }
    }

    /// Look up a bin by exact, case-sensitive id
    pub async fn get_bin(&self, id: &str) -> Result<BinRecord, BinStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, content, language, iv
            FROM bins
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&**self)
        .await?;

        match row {
            Some(row) => Ok(BinRecord::try_from(&row)?),
            None => Err(BinStoreError::NotFound(id.to_string())),
        }
    }

    /// Number of stored bins
    pub async fn count_bins(&self) -> Result<u64, BinStoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bins")
            .fetch_one(&**self)
            .await?;
        Ok(count.max(0) as u64)
    }
}
