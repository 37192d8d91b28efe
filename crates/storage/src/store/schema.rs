#![forbid(unsafe_code)]

use super::{INDEX_SCHEMA_VERSION, StoreError};
use rusqlite::{Connection, params};

pub(super) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tags (
          owner TEXT NOT NULL,
          key TEXT NOT NULL,
          display TEXT NOT NULL,
          recency_ms INTEGER NOT NULL,
          ref_count INTEGER NOT NULL,
          PRIMARY KEY (owner, key)
        );

        CREATE TABLE IF NOT EXISTS relations (
          owner TEXT NOT NULL,
          task_id TEXT NOT NULL,
          tag_key TEXT NOT NULL,
          task_created_at_ms INTEGER NOT NULL,
          PRIMARY KEY (owner, task_id, tag_key)
        );

        CREATE INDEX IF NOT EXISTS relations_by_tag ON relations(owner, tag_key);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["index_schema_version", INDEX_SCHEMA_VERSION],
    )?;

    Ok(())
}
