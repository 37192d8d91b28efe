#![forbid(unsafe_code)]

use crate::backend::{TaskBackend, TaskRecord};
use serde::Serialize;
use tdx_core::ids::OwnerId;
use tdx_core::sidebar::stable_sidebar_id;
use tdx_storage::{
    IndexTaskRequest, RelationRow, RenameTagRequest, SqliteStore, StoreError, TagRow,
    UpsertTagRequest,
};

/// Tag row shaped for the sidebar list: the stable negative id keeps UI
/// rows keyed consistently across reloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SidebarTag {
    pub id: i64,
    pub key: String,
    pub display: String,
    pub reference_count: i64,
    pub recency_ms: i64,
}

/// The tag index engine's public surface. Explicitly constructed and passed
/// where needed; holds the store and the external task store handle by
/// dependency injection, no ambient global instance.
///
/// All mutating methods take `&mut self`, which serializes writers for a
/// given handle; reads borrow shared.
pub struct TagIndexService<B> {
    pub(crate) store: SqliteStore,
    pub(crate) backend: B,
}

impl<B: TaskBackend> TagIndexService<B> {
    pub fn new(store: SqliteStore, backend: B) -> Self {
        Self { store, backend }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Feeds one task through the incremental indexer. The external task
    /// store calls this from its own persistence path on every save.
    pub fn index_task(&mut self, owner: &OwnerId, task: &TaskRecord) -> Result<(), StoreError> {
        self.store.index_task(
            owner,
            IndexTaskRequest {
                task_id: task.task_id.clone(),
                content: task.content.clone(),
                created_at_ms: task.created_at_ms,
                is_deleted: task.is_deleted,
            },
        )
    }

    pub fn fetch_all_tags(&self, owner: &OwnerId) -> Result<Vec<TagRow>, StoreError> {
        self.store.fetch_all_tags(owner)
    }

    pub fn fetch_tag(&self, owner: &OwnerId, key: &str) -> Result<Option<TagRow>, StoreError> {
        self.store.fetch_tag(owner, key)
    }

    pub fn fetch_relations(
        &self,
        owner: &OwnerId,
        tag_key: &str,
    ) -> Result<Vec<RelationRow>, StoreError> {
        self.store.fetch_relations(owner, tag_key)
    }

    pub fn upsert_tag(&mut self, owner: &OwnerId, request: UpsertTagRequest) -> Result<(), StoreError> {
        self.store.upsert_tag(owner, request)
    }

    pub fn rename_tag_key(&mut self, owner: &OwnerId, request: RenameTagRequest) -> Result<(), StoreError> {
        self.store.rename_tag_key(owner, request)
    }

    pub fn delete_tag(&mut self, owner: &OwnerId, key: &str) -> Result<bool, StoreError> {
        self.store.delete_tag(owner, key)
    }

    pub fn sidebar_tags(&self, owner: &OwnerId) -> Result<Vec<SidebarTag>, StoreError> {
        Ok(self
            .store
            .fetch_all_tags(owner)?
            .into_iter()
            .map(sidebar_tag)
            .collect())
    }

    pub fn sidebar_tags_json(&self, owner: &OwnerId) -> Result<String, StoreError> {
        let tags = self.sidebar_tags(owner)?;
        serde_json::to_string(&tags).map_err(|err| StoreError::Serialize(err.to_string()))
    }
}

fn sidebar_tag(tag: TagRow) -> SidebarTag {
    SidebarTag {
        id: stable_sidebar_id(&tag.key),
        key: tag.key,
        display: tag.display,
        reference_count: tag.reference_count,
        recency_ms: tag.recency_ms,
    }
}
