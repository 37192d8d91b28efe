#![forbid(unsafe_code)]

use tdx_core::ids::OwnerId;
use tdx_storage::{SqliteStore, StoreError};

/// Read view of a task as the external task store exposes it. The index
/// engine never owns or mutates task records; the only write-back is
/// [`TaskBackend::update_task`] during a bulk rewrite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskRecord {
    pub task_id: String,
    pub content: String,
    pub created_at_ms: i64,
    pub is_deleted: bool,
}

/// Interface to the external task store.
///
/// `update_task` is the store's normal task-update path: it must persist the
/// new content (bumping its own version/sync metadata) and re-invoke
/// `index_task` on the given store handle, so content stays the single
/// source of truth and the index re-derives itself. The task save and the
/// reindex are two separate commits; a crash between them is reconciled by
/// the next `index_task` call for that task.
pub trait TaskBackend {
    fn fetch_task(&self, owner: &OwnerId, task_id: &str) -> Result<Option<TaskRecord>, StoreError>;

    fn all_tasks(&self) -> Result<Vec<(OwnerId, TaskRecord)>, StoreError>;

    fn update_task(
        &mut self,
        index: &mut SqliteStore,
        owner: &OwnerId,
        task: &TaskRecord,
    ) -> Result<(), StoreError>;
}
