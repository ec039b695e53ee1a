use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use common::bin::Bin;

/// A stored bin together with the id it lives under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinRecord {
    pub id: String,
    #[serde(flatten)]
    pub bin: Bin,
}

impl BinRecord {
    pub fn into_bin(self) -> Bin {
        self.bin
    }
}

impl TryFrom<&SqliteRow> for BinRecord {
    type Error = sqlx::Error;

    // Columns are nullable in the schema; rows written by this service never
    // hold NULL, but older databases may, so NULL reads back as "".
    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        let text = |column: &str| -> Result<String, sqlx::Error> {
            Ok(row
                .try_get::<Option<String>, _>(column)?
                .unwrap_or_default())
        };

        Ok(Self {
            id: row.try_get("id")?,
            bin: Bin {
                content: text("content")?,
                language: text("language")?,
                iv: text("iv")?,
            },
        })
    }
}
