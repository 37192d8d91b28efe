#![forbid(unsafe_code)]

use crate::backend::{TaskBackend, TaskRecord};
use crate::service::TagIndexService;
use tdx_core::ids::OwnerId;
use tdx_core::text;

/// Aggregate result of a bulk rewrite. Per-task failures never abort the
/// batch; callers see how many tasks actually changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub tasks_changed: usize,
    pub tasks_failed: usize,
}

#[derive(Clone, Copy, Debug)]
enum RewriteMode {
    RemoveCompletely,
    StripHashOnly,
}

impl<B: TaskBackend> TagIndexService<B> {
    /// Rewrites every task referencing `key`, deleting the literal tag plus
    /// trailing spaces/tabs and tidying the remaining whitespace.
    pub fn remove_tag_completely(&mut self, owner: &OwnerId, key: &str) -> RewriteOutcome {
        self.rewrite_tasks(owner, key, RewriteMode::RemoveCompletely)
    }

    /// Rewrites every task referencing `key`, keeping the word but dropping
    /// its `#` marker so it stops being a tag.
    pub fn remove_hash_only(&mut self, owner: &OwnerId, key: &str) -> RewriteOutcome {
        self.rewrite_tasks(owner, key, RewriteMode::StripHashOnly)
    }

    /// Each changed task goes back through the external task-update path,
    /// which re-runs the indexer on the new content; the index is never
    /// mutated directly here, so content stays the source of truth.
    fn rewrite_tasks(&mut self, owner: &OwnerId, key: &str, mode: RewriteMode) -> RewriteOutcome {
        let mut outcome = RewriteOutcome::default();
        if key.trim().is_empty() {
            eprintln!("tagdex: bulk rewrite rejected an empty tag key");
            return outcome;
        }

        let relations = match self.store.fetch_relations(owner, key) {
            Ok(relations) => relations,
            Err(err) => {
                eprintln!("tagdex: bulk rewrite of {key} could not list relations: {err}");
                return outcome;
            }
        };

        for relation in relations {
            let task = match self.backend.fetch_task(owner, &relation.task_id) {
                Ok(Some(task)) => task,
                Ok(None) => continue,
                Err(err) => {
                    eprintln!(
                        "tagdex: bulk rewrite could not load task {}: {err}",
                        relation.task_id
                    );
                    outcome.tasks_failed += 1;
                    continue;
                }
            };
            if task.is_deleted {
                continue;
            }

            let rewritten = match mode {
                RewriteMode::RemoveCompletely => text::remove_tag_completely(&task.content, key),
                RewriteMode::StripHashOnly => text::strip_hash_marker(&task.content, key),
            };
            if rewritten == task.content {
                continue;
            }

            let updated = TaskRecord {
                content: rewritten,
                ..task
            };
            match self.backend.update_task(&mut self.store, owner, &updated) {
                Ok(()) => outcome.tasks_changed += 1,
                Err(err) => {
                    eprintln!(
                        "tagdex: bulk rewrite could not update task {}: {err}",
                        updated.task_id
                    );
                    outcome.tasks_failed += 1;
                }
            }
        }

        // Confirmation pass: the per-task reindexes should have emptied the
        // tag; if an edge survived a silent failure the tag stays, otherwise
        // drop any drifting aggregate row.
        match self.store.fetch_relations(owner, key) {
            Ok(remaining) if remaining.is_empty() => {
                if let Err(err) = self.store.delete_tag(owner, key) {
                    eprintln!("tagdex: bulk rewrite could not drop tag {key}: {err}");
                }
            }
            Ok(_) => {}
            Err(err) => {
                eprintln!("tagdex: bulk rewrite could not confirm tag {key}: {err}");
            }
        }

        outcome
    }
}
