#![forbid(unsafe_code)]

use super::*;
use rusqlite::{OptionalExtension, params};

/// Owner value carried by rows written before owner scoping existed. Their
/// presence is the trigger for the one-time index rebuild.
pub const LEGACY_OWNER_SENTINEL: &str = "";

impl SqliteStore {
    /// Bounded probe (`LIMIT 1` per table) for pre-scoping rows.
    pub fn legacy_index_rows_exist(&self) -> Result<bool, StoreError> {
        let legacy_tag = self
            .conn
            .query_row(
                "SELECT 1 FROM tags WHERE owner = ?1 LIMIT 1",
                params![LEGACY_OWNER_SENTINEL],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        if legacy_tag.is_some() {
            return Ok(true);
        }
        let legacy_relation = self
            .conn
            .query_row(
                "SELECT 1 FROM relations WHERE owner = ?1 LIMIT 1",
                params![LEGACY_OWNER_SENTINEL],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(legacy_relation.is_some())
    }

    /// Wipes both derived tables and bulk-inserts the accumulated rows in
    /// one transaction. Safe because tags and relations are fully
    /// recomputable from task content.
    pub fn rebuild_index(
        &mut self,
        tags: Vec<RebuiltTag>,
        relations: Vec<RebuiltRelation>,
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM tags", [])?;
        tx.execute("DELETE FROM relations", [])?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO tags(owner, key, display, recency_ms, ref_count)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for tag in &tags {
                stmt.execute(params![
                    tag.owner,
                    tag.key,
                    tag.display,
                    tag.recency_ms,
                    tag.reference_count
                ])?;
            }
        }
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO relations(owner, task_id, tag_key, task_created_at_ms)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )?;
            for relation in &relations {
                stmt.execute(params![
                    relation.owner,
                    relation.task_id,
                    relation.tag_key,
                    relation.task_created_at_ms
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}
