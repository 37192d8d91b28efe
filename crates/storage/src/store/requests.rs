#![forbid(unsafe_code)]

/// Snapshot of a task handed to the incremental indexer. The task record
/// itself is owned by the external task store; the index only reads it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexTaskRequest {
    pub task_id: String,
    pub content: String,
    pub created_at_ms: i64,
    pub is_deleted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameTagRequest {
    pub from_key: String,
    pub to_key: String,
    pub new_display: Option<String>,
}

/// Administrative upsert that bypasses content derivation. Used sparingly;
/// the indexer is the normal write path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpsertTagRequest {
    pub key: String,
    pub display: Option<String>,
    pub recency_ms: i64,
    pub reference_count: i64,
}

/// Accumulated tag aggregate for the wipe-and-rebuild path. Carries the
/// owner explicitly because a rebuild spans every scope at once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebuiltTag {
    pub owner: String,
    pub key: String,
    pub display: String,
    pub recency_ms: i64,
    pub reference_count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebuiltRelation {
    pub owner: String,
    pub task_id: String,
    pub tag_key: String,
    pub task_created_at_ms: i64,
}
