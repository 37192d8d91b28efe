#![forbid(unsafe_code)]

mod error;
mod indexer;
mod meta;
mod rebuild;
mod relations;
mod rename;
mod requests;
mod schema;
mod tags;

pub use error::StoreError;
pub use rebuild::LEGACY_OWNER_SENTINEL;
pub use requests::*;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tdx_core::ids::OwnerId;

pub const DB_FILE_NAME: &str = "tagdex.db";

/// Version string for the derived-index schema. Bump it to force a one-time
/// rebuild of tags/relations from task content on next startup.
pub const INDEX_SCHEMA_VERSION: &str = "v2";

/// Aggregate record for one tag key within one owner scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagRow {
    pub key: String,
    pub display: String,
    pub recency_ms: i64,
    pub reference_count: i64,
}

/// Edge recording that one task's current content contains one tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationRow {
    pub task_id: String,
    pub tag_key: String,
    pub task_created_at_ms: i64,
}

/// SQLite-backed tag index. Tags and relations are derived cache rows, fully
/// recomputable from non-deleted task content; that property licenses the
/// wipe-and-rebuild path in [`SqliteStore::rebuild_index`].
///
/// Writers take `&mut self`, so a store handle is a single logical writer
/// per owner scope; reads take `&self`.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;

        schema::install_schema(&conn)?;

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }
}

fn canonicalize_tag_key(value: &str) -> Result<&str, StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidTagKey("tag key must not be empty"));
    }
    Ok(value)
}
