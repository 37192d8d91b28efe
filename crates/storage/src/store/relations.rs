#![forbid(unsafe_code)]

use super::*;
use rusqlite::{OptionalExtension, Row, Transaction, params};

impl SqliteStore {
    pub fn fetch_relations(
        &self,
        owner: &OwnerId,
        tag_key: &str,
    ) -> Result<Vec<RelationRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT task_id, tag_key, task_created_at_ms
            FROM relations
            WHERE owner = ?1 AND tag_key = ?2
            ORDER BY task_id ASC
            "#,
        )?;
        let rows = stmt.query_map(params![owner.as_str(), tag_key], relation_row)?;
        let mut relations = Vec::new();
        for row in rows {
            relations.push(row?);
        }
        Ok(relations)
    }

    pub fn relations_for_task(
        &self,
        owner: &OwnerId,
        task_id: &str,
    ) -> Result<Vec<RelationRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT task_id, tag_key, task_created_at_ms
            FROM relations
            WHERE owner = ?1 AND task_id = ?2
            ORDER BY tag_key ASC
            "#,
        )?;
        let rows = stmt.query_map(params![owner.as_str(), task_id], relation_row)?;
        let mut relations = Vec::new();
        for row in rows {
            relations.push(row?);
        }
        Ok(relations)
    }
}

fn relation_row(row: &Row<'_>) -> rusqlite::Result<RelationRow> {
    Ok(RelationRow {
        task_id: row.get(0)?,
        tag_key: row.get(1)?,
        task_created_at_ms: row.get(2)?,
    })
}

pub(super) fn relations_for_task_tx(
    tx: &Transaction<'_>,
    owner: &str,
    task_id: &str,
) -> Result<Vec<RelationRow>, StoreError> {
    let mut stmt = tx.prepare(
        r#"
        SELECT task_id, tag_key, task_created_at_ms
        FROM relations
        WHERE owner = ?1 AND task_id = ?2
        ORDER BY tag_key ASC
        "#,
    )?;
    let rows = stmt.query_map(params![owner, task_id], relation_row)?;
    let mut relations = Vec::new();
    for row in rows {
        relations.push(row?);
    }
    Ok(relations)
}

pub(super) fn relation_exists_tx(
    tx: &Transaction<'_>,
    owner: &str,
    task_id: &str,
    tag_key: &str,
) -> Result<bool, StoreError> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM relations WHERE owner = ?1 AND task_id = ?2 AND tag_key = ?3",
            params![owner, task_id, tag_key],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}

pub(super) fn insert_relation_tx(
    tx: &Transaction<'_>,
    owner: &str,
    task_id: &str,
    tag_key: &str,
    task_created_at_ms: i64,
) -> Result<(), StoreError> {
    tx.execute(
        r#"
        INSERT INTO relations(owner, task_id, tag_key, task_created_at_ms)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![owner, task_id, tag_key, task_created_at_ms],
    )?;
    Ok(())
}

pub(super) fn delete_relation_tx(
    tx: &Transaction<'_>,
    owner: &str,
    task_id: &str,
    tag_key: &str,
) -> Result<(), StoreError> {
    tx.execute(
        "DELETE FROM relations WHERE owner = ?1 AND task_id = ?2 AND tag_key = ?3",
        params![owner, task_id, tag_key],
    )?;
    Ok(())
}

pub(super) fn max_created_at_for_tag_tx(
    tx: &Transaction<'_>,
    owner: &str,
    tag_key: &str,
) -> Result<Option<i64>, StoreError> {
    Ok(tx.query_row(
        "SELECT MAX(task_created_at_ms) FROM relations WHERE owner = ?1 AND tag_key = ?2",
        params![owner, tag_key],
        |row| row.get::<_, Option<i64>>(0),
    )?)
}
