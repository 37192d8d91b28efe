#![forbid(unsafe_code)]

use crate::backend::TaskBackend;
use crate::service::TagIndexService;
use std::collections::BTreeMap;
use tdx_storage::{INDEX_SCHEMA_VERSION, RebuiltRelation, RebuiltTag, StoreError};

/// Meta key gating the one-time rebuild for the current index schema.
pub fn migration_flag_key() -> String {
    format!("tag_index_migrated_{INDEX_SCHEMA_VERSION}")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrationOutcome {
    AlreadyMigrated,
    NothingToMigrate,
    Rebuilt { tags: usize, relations: usize },
}

struct TagAccumulator {
    display: String,
    recency_ms: i64,
    count: i64,
}

impl<B: TaskBackend> TagIndexService<B> {
    /// Best-effort startup hook. Failures are logged and swallowed so a
    /// broken derived index can never block the task-editing experience;
    /// the flag stays unset, so the next launch retries.
    pub fn migrate_legacy_index_if_needed(&mut self) {
        match self.migrate_legacy_index() {
            Ok(MigrationOutcome::Rebuilt { tags, relations }) => {
                eprintln!("tagdex: rebuilt tag index ({tags} tags, {relations} relations)");
            }
            Ok(_) => {}
            Err(err) => {
                eprintln!("tagdex: tag index migration failed, will retry next launch: {err}");
            }
        }
    }

    /// Flag-gated full rebuild of the derived index.
    ///
    /// If the flag for [`INDEX_SCHEMA_VERSION`] is set this is a no-op. A
    /// bounded probe then looks for pre-scoping rows; none found means
    /// nothing to migrate and the flag is set directly. Otherwise every
    /// non-deleted task is rescanned, the accumulated tags/relations replace
    /// both tables wholesale, and only then is the flag set, so an abandoned
    /// run restarts from scratch.
    pub fn migrate_legacy_index(&mut self) -> Result<MigrationOutcome, StoreError> {
        let flag = migration_flag_key();
        if self.store.meta_get(&flag)?.is_some() {
            return Ok(MigrationOutcome::AlreadyMigrated);
        }
        if !self.store.legacy_index_rows_exist()? {
            self.store.meta_set(&flag, "1")?;
            return Ok(MigrationOutcome::NothingToMigrate);
        }

        let mut accumulated: BTreeMap<(String, String), TagAccumulator> = BTreeMap::new();
        let mut relations = Vec::new();
        for (owner, task) in self.backend.all_tasks()? {
            if task.is_deleted {
                continue;
            }
            for key in tdx_core::grammar::unique_keys(&task.content) {
                let entry = accumulated
                    .entry((owner.as_str().to_string(), key.clone()))
                    .or_insert_with(|| TagAccumulator {
                        display: key.clone(),
                        recency_ms: task.created_at_ms,
                        count: 0,
                    });
                entry.count += 1;
                entry.recency_ms = entry.recency_ms.max(task.created_at_ms);
                relations.push(RebuiltRelation {
                    owner: owner.as_str().to_string(),
                    task_id: task.task_id.clone(),
                    tag_key: key,
                    task_created_at_ms: task.created_at_ms,
                });
            }
        }

        let tags: Vec<RebuiltTag> = accumulated
            .into_iter()
            .map(|((owner, key), entry)| RebuiltTag {
                owner,
                key,
                display: entry.display,
                recency_ms: entry.recency_ms,
                reference_count: entry.count,
            })
            .collect();
        let tag_count = tags.len();
        let relation_count = relations.len();

        self.store.rebuild_index(tags, relations)?;
        self.store.meta_set(&flag, "1")?;
        Ok(MigrationOutcome::Rebuilt {
            tags: tag_count,
            relations: relation_count,
        })
    }
}
