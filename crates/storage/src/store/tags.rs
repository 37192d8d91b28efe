#![forbid(unsafe_code)]

use super::*;
use rusqlite::{OptionalExtension, Row, Transaction, params};

impl SqliteStore {
    /// All tags for one owner, most recently referenced first. Key breaks
    /// ties so the order is stable across reloads.
    pub fn fetch_all_tags(&self, owner: &OwnerId) -> Result<Vec<TagRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT key, display, recency_ms, ref_count
            FROM tags
            WHERE owner = ?1
            ORDER BY recency_ms DESC, key ASC
            "#,
        )?;
        let rows = stmt.query_map(params![owner.as_str()], tag_row)?;
        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }

    pub fn fetch_tag(&self, owner: &OwnerId, key: &str) -> Result<Option<TagRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT key, display, recency_ms, ref_count FROM tags WHERE owner = ?1 AND key = ?2",
                params![owner.as_str(), key],
                tag_row,
            )
            .optional()?)
    }

    /// Administrative path that writes the aggregate directly, bypassing
    /// content derivation. The indexer remains the source of truth for
    /// normal edits. A count of zero follows the tag lifecycle and removes
    /// the row (and its relations) instead of storing an unreferenced tag.
    pub fn upsert_tag(&mut self, owner: &OwnerId, request: UpsertTagRequest) -> Result<(), StoreError> {
        let key = canonicalize_tag_key(&request.key)?;
        if request.reference_count < 0 {
            return Err(StoreError::InvalidInput("reference_count must not be negative"));
        }
        if request.reference_count == 0 {
            self.delete_tag(owner, &key)?;
            return Ok(());
        }
        self.conn.execute(
            r#"
            INSERT INTO tags(owner, key, display, recency_ms, ref_count)
            VALUES (?1, ?2, COALESCE(?3, ?2), ?4, ?5)
            ON CONFLICT(owner, key) DO UPDATE SET
              display = COALESCE(?3, tags.display),
              recency_ms = ?4,
              ref_count = ?5
            "#,
            params![
                owner.as_str(),
                key,
                request.display,
                request.recency_ms,
                request.reference_count
            ],
        )?;
        Ok(())
    }

    /// Deletes the tag and all its relations in one transaction. Task
    /// content is not touched. Returns whether a tag row existed.
    pub fn delete_tag(&mut self, owner: &OwnerId, key: &str) -> Result<bool, StoreError> {
        let key = canonicalize_tag_key(key)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM relations WHERE owner = ?1 AND tag_key = ?2",
            params![owner.as_str(), key],
        )?;
        let deleted = tx.execute(
            "DELETE FROM tags WHERE owner = ?1 AND key = ?2",
            params![owner.as_str(), key],
        )?;
        tx.commit()?;
        Ok(deleted > 0)
    }
}

fn tag_row(row: &Row<'_>) -> rusqlite::Result<TagRow> {
    Ok(TagRow {
        key: row.get(0)?,
        display: row.get(1)?,
        recency_ms: row.get(2)?,
        reference_count: row.get(3)?,
    })
}

pub(super) fn fetch_tag_tx(
    tx: &Transaction<'_>,
    owner: &str,
    key: &str,
) -> Result<Option<TagRow>, StoreError> {
    Ok(tx
        .query_row(
            "SELECT key, display, recency_ms, ref_count FROM tags WHERE owner = ?1 AND key = ?2",
            params![owner, key],
            tag_row,
        )
        .optional()?)
}
