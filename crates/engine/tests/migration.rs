#![forbid(unsafe_code)]

use rusqlite::{Connection, params};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tdx_core::ids::OwnerId;
use tdx_engine::{MigrationOutcome, TagIndexService, TaskBackend, TaskRecord, migration_flag_key};
use tdx_storage::{
    DB_FILE_NAME, IndexTaskRequest, LEGACY_OWNER_SENTINEL, SqliteStore, StoreError,
};

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("tdx_engine_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[derive(Default)]
struct MemoryTasks {
    tasks: BTreeMap<(String, String), TaskRecord>,
    fail_all_tasks: bool,
}

impl MemoryTasks {
    fn insert(&mut self, owner: &str, task: TaskRecord) {
        self.tasks
            .insert((owner.to_string(), task.task_id.clone()), task);
    }
}

impl TaskBackend for MemoryTasks {
    fn fetch_task(&self, owner: &OwnerId, task_id: &str) -> Result<Option<TaskRecord>, StoreError> {
        Ok(self
            .tasks
            .get(&(owner.as_str().to_string(), task_id.to_string()))
            .cloned())
    }

    fn all_tasks(&self) -> Result<Vec<(OwnerId, TaskRecord)>, StoreError> {
        if self.fail_all_tasks {
            return Err(StoreError::InvalidInput("simulated task scan failure"));
        }
        let mut out = Vec::new();
        for ((owner, _), task) in &self.tasks {
            let owner = OwnerId::try_new(owner.clone())
                .map_err(|_| StoreError::InvalidInput("bad owner in fake store"))?;
            out.push((owner, task.clone()));
        }
        Ok(out)
    }

    fn update_task(
        &mut self,
        index: &mut SqliteStore,
        owner: &OwnerId,
        task: &TaskRecord,
    ) -> Result<(), StoreError> {
        self.insert(owner.as_str(), task.clone());
        index.index_task(
            owner,
            IndexTaskRequest {
                task_id: task.task_id.clone(),
                content: task.content.clone(),
                created_at_ms: task.created_at_ms,
                is_deleted: task.is_deleted,
            },
        )
    }
}

fn task(task_id: &str, content: &str, created_at_ms: i64, is_deleted: bool) -> TaskRecord {
    TaskRecord {
        task_id: task_id.to_string(),
        content: content.to_string(),
        created_at_ms,
        is_deleted,
    }
}

fn seed_legacy_rows(storage_dir: &PathBuf) {
    let raw = Connection::open(storage_dir.join(DB_FILE_NAME)).expect("open raw connection");
    raw.execute(
        "INSERT INTO tags(owner, key, display, recency_ms, ref_count) VALUES (?1, ?2, ?2, 10, 1)",
        params![LEGACY_OWNER_SENTINEL, "#legacy"],
    )
    .expect("seed legacy tag");
    raw.execute(
        "INSERT INTO relations(owner, task_id, tag_key, task_created_at_ms) VALUES (?1, 'T-legacy', ?2, 10)",
        params![LEGACY_OWNER_SENTINEL, "#legacy"],
    )
    .expect("seed legacy relation");
}

fn count_rows(storage_dir: &PathBuf, table: &str, owner: &str) -> i64 {
    let raw = Connection::open(storage_dir.join(DB_FILE_NAME)).expect("open raw connection");
    raw.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE owner = ?1"),
        params![owner],
        |row| row.get(0),
    )
    .expect("count rows")
}

#[test]
fn clean_store_sets_the_flag_without_rebuilding() {
    let store = SqliteStore::open(temp_dir("clean_store")).expect("open store");
    let mut service = TagIndexService::new(store, MemoryTasks::default());

    assert_eq!(
        service.migrate_legacy_index().expect("migrate"),
        MigrationOutcome::NothingToMigrate
    );
    assert_eq!(
        service.store().meta_get(&migration_flag_key()).expect("meta get"),
        Some("1".to_string())
    );
    assert_eq!(
        service.migrate_legacy_index().expect("migrate"),
        MigrationOutcome::AlreadyMigrated
    );
}

#[test]
fn legacy_rows_trigger_a_full_rebuild_from_task_content() {
    let storage_dir = temp_dir("legacy_rebuild");
    let store = SqliteStore::open(&storage_dir).expect("open store");
    seed_legacy_rows(&storage_dir);

    let mut backend = MemoryTasks::default();
    backend.insert("owner-1", task("T-1", "plan #q3 launch #prep now", 100, false));
    backend.insert("owner-1", task("T-2", "review #q3 notes", 200, false));
    backend.insert("owner-1", task("T-gone", "old #q3 stuff", 300, true));
    backend.insert("owner-2", task("T-1", "their #q3 work", 400, false));

    let mut service = TagIndexService::new(store, backend);
    let outcome = service.migrate_legacy_index().expect("migrate");
    assert_eq!(outcome, MigrationOutcome::Rebuilt { tags: 3, relations: 4 });

    let first = OwnerId::try_new("owner-1").expect("owner id");
    let second = OwnerId::try_new("owner-2").expect("owner id");

    let q3 = service.fetch_tag(&first, "#q3").expect("fetch").expect("q3");
    assert_eq!(q3.reference_count, 2);
    assert_eq!(q3.recency_ms, 200);
    let prep = service.fetch_tag(&first, "#prep").expect("fetch").expect("prep");
    assert_eq!(prep.reference_count, 1);
    let theirs = service.fetch_tag(&second, "#q3").expect("fetch").expect("theirs");
    assert_eq!(theirs.reference_count, 1);
    assert_eq!(theirs.recency_ms, 400);

    // The unscoped rows were wiped with everything else.
    assert_eq!(count_rows(&storage_dir, "tags", LEGACY_OWNER_SENTINEL), 0);
    assert_eq!(count_rows(&storage_dir, "relations", LEGACY_OWNER_SENTINEL), 0);
    assert_eq!(
        service.store().meta_get(&migration_flag_key()).expect("meta get"),
        Some("1".to_string())
    );
}

#[test]
fn second_migration_call_short_circuits_with_identical_state() {
    let storage_dir = temp_dir("idempotent_migration");
    let store = SqliteStore::open(&storage_dir).expect("open store");
    seed_legacy_rows(&storage_dir);

    let mut backend = MemoryTasks::default();
    backend.insert("owner-1", task("T-1", "deep #focus work now", 100, false));

    let mut service = TagIndexService::new(store, backend);
    assert!(matches!(
        service.migrate_legacy_index().expect("migrate"),
        MigrationOutcome::Rebuilt { .. }
    ));
    let owner = OwnerId::try_new("owner-1").expect("owner id");
    let after_first = service.fetch_all_tags(&owner).expect("fetch tags");

    assert_eq!(
        service.migrate_legacy_index().expect("migrate"),
        MigrationOutcome::AlreadyMigrated
    );
    assert_eq!(service.fetch_all_tags(&owner).expect("fetch tags"), after_first);
}

#[test]
fn failed_migration_leaves_the_flag_unset_for_retry() {
    let storage_dir = temp_dir("failed_migration");
    let store = SqliteStore::open(&storage_dir).expect("open store");
    seed_legacy_rows(&storage_dir);

    let mut backend = MemoryTasks::default();
    backend.fail_all_tasks = true;
    backend.insert("owner-1", task("T-1", "deep #focus work now", 100, false));

    let mut service = TagIndexService::new(store, backend);
    // The swallowing wrapper must not propagate or panic.
    service.migrate_legacy_index_if_needed();
    assert_eq!(
        service.store().meta_get(&migration_flag_key()).expect("meta get"),
        None
    );

    // Once the scan works again the rebuild goes through.
    service.backend_mut().fail_all_tasks = false;
    assert!(matches!(
        service.migrate_legacy_index().expect("migrate"),
        MigrationOutcome::Rebuilt { .. }
    ));
    assert_eq!(
        service.store().meta_get(&migration_flag_key()).expect("meta get"),
        Some("1".to_string())
    );
}
