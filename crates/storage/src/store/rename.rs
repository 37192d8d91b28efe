#![forbid(unsafe_code)]

use super::tags::fetch_tag_tx;
use super::*;
use rusqlite::params;

impl SqliteStore {
    /// Renames a tag key, merging into the target when it already exists.
    ///
    /// Index-only: the literal `#fromKey` text inside task bodies is not
    /// rewritten, so a renamed tag's display can diverge from the task text
    /// until that task is next edited.
    pub fn rename_tag_key(&mut self, owner: &OwnerId, request: RenameTagRequest) -> Result<(), StoreError> {
        let from_key = canonicalize_tag_key(&request.from_key)?;
        let to_key = canonicalize_tag_key(&request.to_key)?;
        let tx = self.conn.transaction()?;

        if from_key == to_key {
            if let Some(display) = display_override(request.new_display.as_deref()) {
                tx.execute(
                    "UPDATE tags SET display = ?3 WHERE owner = ?1 AND key = ?2",
                    params![owner.as_str(), to_key, display],
                )?;
            }
            tx.commit()?;
            return Ok(());
        }

        let Some(from_tag) = fetch_tag_tx(&tx, owner.as_str(), from_key)? else {
            // Nothing to rename.
            return Ok(());
        };

        if let Some(to_tag) = fetch_tag_tx(&tx, owner.as_str(), to_key)? {
            // Merge. OR REPLACE collapses the duplicate edge when a task
            // held both keys; the aggregate is then recounted from the
            // relations table so the count invariant survives the overlap.
            tx.execute(
                "UPDATE OR REPLACE relations SET tag_key = ?3 WHERE owner = ?1 AND tag_key = ?2",
                params![owner.as_str(), from_key, to_key],
            )?;
            tx.execute(
                "DELETE FROM tags WHERE owner = ?1 AND key = ?2",
                params![owner.as_str(), from_key],
            )?;
            let reference_count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM relations WHERE owner = ?1 AND tag_key = ?2",
                params![owner.as_str(), to_key],
                |row| row.get(0),
            )?;
            let display = display_override(request.new_display.as_deref())
                .unwrap_or_else(|| effective_display(&to_tag.display, to_key));
            tx.execute(
                r#"
                UPDATE tags SET display = ?3, recency_ms = ?4, ref_count = ?5
                WHERE owner = ?1 AND key = ?2
                "#,
                params![
                    owner.as_str(),
                    to_key,
                    display,
                    to_tag.recency_ms.max(from_tag.recency_ms),
                    reference_count
                ],
            )?;
        } else {
            // Pure rename: carry count and recency over unchanged.
            tx.execute(
                "UPDATE relations SET tag_key = ?3 WHERE owner = ?1 AND tag_key = ?2",
                params![owner.as_str(), from_key, to_key],
            )?;
            let display = display_override(request.new_display.as_deref())
                .unwrap_or_else(|| effective_display(&from_tag.display, to_key));
            tx.execute(
                "UPDATE tags SET key = ?3, display = ?4 WHERE owner = ?1 AND key = ?2",
                params![owner.as_str(), from_key, to_key, display],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

fn display_override(new_display: Option<&str>) -> Option<String> {
    new_display
        .map(str::trim)
        .filter(|display| !display.is_empty())
        .map(str::to_string)
}

fn effective_display(existing: &str, fallback_key: &str) -> String {
    if existing.trim().is_empty() {
        fallback_key.to_string()
    } else {
        existing.to_string()
    }
}
