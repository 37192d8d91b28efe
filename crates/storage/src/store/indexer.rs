#![forbid(unsafe_code)]

use super::relations::{
    delete_relation_tx, insert_relation_tx, max_created_at_for_tag_tx, relation_exists_tx,
    relations_for_task_tx,
};
use super::tags::fetch_tag_tx;
use super::*;
use rusqlite::{Transaction, params};
use std::collections::BTreeSet;

impl SqliteStore {
    /// Incremental index maintenance for one task.
    ///
    /// Diffs the tag keys extracted from `content` against the task's stored
    /// relations and applies the minimal set of mutations: removed keys
    /// detach (decrement, delete the aggregate at zero, recompute recency
    /// only when the removed edge carried it), added keys attach (upsert the
    /// aggregate, insert the edge). A deleted task detaches everything.
    ///
    /// The whole diff commits as one transaction, and the operation is
    /// idempotent: re-running with unchanged inputs produces an empty diff.
    pub fn index_task(&mut self, owner: &OwnerId, request: IndexTaskRequest) -> Result<(), StoreError> {
        if request.task_id.trim().is_empty() {
            return Err(StoreError::InvalidInput("task_id must not be empty"));
        }

        let tx = self.conn.transaction()?;
        let stored = relations_for_task_tx(&tx, owner.as_str(), &request.task_id)?;

        if request.is_deleted {
            for relation in &stored {
                delete_relation_tx(&tx, owner.as_str(), &request.task_id, &relation.tag_key)?;
                detach_tag_tx(&tx, owner.as_str(), &relation.tag_key, relation.task_created_at_ms)?;
            }
            tx.commit()?;
            return Ok(());
        }

        let new_keys = tdx_core::grammar::unique_keys(&request.content);
        let new_set: BTreeSet<&str> = new_keys.iter().map(String::as_str).collect();
        let old_set: BTreeSet<&str> = stored.iter().map(|r| r.tag_key.as_str()).collect();

        // Removals are processed strictly before additions so a key can
        // never be double-counted within one call.
        for relation in &stored {
            if new_set.contains(relation.tag_key.as_str()) {
                continue;
            }
            delete_relation_tx(&tx, owner.as_str(), &request.task_id, &relation.tag_key)?;
            detach_tag_tx(&tx, owner.as_str(), &relation.tag_key, relation.task_created_at_ms)?;
        }

        for key in &new_keys {
            if old_set.contains(key.as_str()) {
                continue;
            }
            // Guard against re-entrant calls racing the diff; under correct
            // diffing the relation cannot already exist.
            if relation_exists_tx(&tx, owner.as_str(), &request.task_id, key)? {
                continue;
            }
            attach_tag_tx(&tx, owner.as_str(), key, request.created_at_ms)?;
            insert_relation_tx(&tx, owner.as_str(), &request.task_id, key, request.created_at_ms)?;
        }

        tx.commit()?;
        Ok(())
    }
}

/// Upserts the aggregate for a newly attached edge. The display text is the
/// literal matched token, which equals the key.
fn attach_tag_tx(
    tx: &Transaction<'_>,
    owner: &str,
    key: &str,
    created_at_ms: i64,
) -> Result<(), StoreError> {
    tx.execute(
        r#"
        INSERT INTO tags(owner, key, display, recency_ms, ref_count)
        VALUES (?1, ?2, ?2, ?3, 1)
        ON CONFLICT(owner, key) DO UPDATE SET
          ref_count = tags.ref_count + 1,
          recency_ms = MAX(tags.recency_ms, excluded.recency_ms)
        "#,
        params![owner, key, created_at_ms],
    )?;
    Ok(())
}

/// Settles the aggregate after its relation row was deleted: decrement the
/// reference count, drop the tag entirely at zero, and recompute recency
/// (one extra MAX query) only when the removed edge held it.
fn detach_tag_tx(
    tx: &Transaction<'_>,
    owner: &str,
    key: &str,
    removed_created_at_ms: i64,
) -> Result<(), StoreError> {
    let Some(tag) = fetch_tag_tx(tx, owner, key)? else {
        // Consistency violation: a relation referenced a missing tag. Keep
        // going with the best available data instead of failing the edit.
        eprintln!("tagdex: relation for {key} had no tag row; skipping decrement");
        return Ok(());
    };

    if tag.reference_count <= 1 {
        tx.execute(
            "DELETE FROM tags WHERE owner = ?1 AND key = ?2",
            params![owner, key],
        )?;
        return Ok(());
    }

    let recency_ms = if removed_created_at_ms == tag.recency_ms {
        max_created_at_for_tag_tx(tx, owner, key)?.unwrap_or(tag.recency_ms)
    } else {
        tag.recency_ms
    };
    tx.execute(
        "UPDATE tags SET ref_count = ref_count - 1, recency_ms = ?3 WHERE owner = ?1 AND key = ?2",
        params![owner, key, recency_ms],
    )?;
    Ok(())
}
