use chrono::NaiveDate;
use rusqlite::params;
use taskmaster_core::db::open_db_in_memory;
use taskmaster_core::{
    ExportError, RepoError, RepoResult, ServiceError, Snapshot, SnapshotRepository,
    SqliteSnapshotRepository, StoreError, TaskCandidate, TaskId, TaskPatch, TaskQuery,
    TaskService, TaskStatus, TaskStore, DEFAULT_SNAPSHOT_KEY,
};

const PLAN: &str = "## Phase 1: Setup\n- [x] Init repo\n- [ ] Write docs\n";

struct UnavailableRepo;

impl SnapshotRepository for UnavailableRepo {
    fn load_snapshot(&self) -> RepoResult<Option<Snapshot>> {
        Err(RepoError::InvalidData("storage unavailable".to_string()))
    }

    fn save_snapshot(&self, _snapshot: &Snapshot) -> RepoResult<()> {
        Err(RepoError::InvalidData("storage unavailable".to_string()))
    }
}

#[test]
fn imported_documents_survive_persist_and_reopen() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    {
        let mut service = TaskService::open(SqliteSnapshotRepository::new(&conn));
        let summary = service.import_document(PLAN, "plan.md");
        assert_eq!(summary.inserted, 2);
        service.persist().expect("persist should succeed");
    }

    let mut reopened = TaskService::open(SqliteSnapshotRepository::new(&conn));
    assert_eq!(reopened.store().len(), 2);

    let second = reopened.import_document(PLAN, "plan.md");
    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 0);
    assert_eq!(second.unchanged, 2);
}

#[test]
fn mutations_do_not_persist_until_asked() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    let mut service = TaskService::open(SqliteSnapshotRepository::new(&conn));
    service.add_task(TaskCandidate::manual("not yet saved"));

    let reopened = TaskService::open(SqliteSnapshotRepository::new(&conn));
    assert!(reopened.store().is_empty());
}

#[test]
fn crud_round_trip_through_service() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    let mut service = TaskService::open(SqliteSnapshotRepository::new(&conn));

    let task = service.add_task(TaskCandidate::manual("Draft release notes"));
    let updated = service
        .update_task(
            &task.id,
            TaskPatch {
                notes: Some("include migration steps".to_string()),
                ..TaskPatch::default()
            },
        )
        .expect("task should exist");
    assert_eq!(updated.notes, "include migration steps");

    let toggled = service.toggle_task(&task.id).expect("task should exist");
    assert_eq!(toggled.status, TaskStatus::Completed);
    assert_eq!(service.stats().completion_rate, 100);

    assert!(service.delete_task(&task.id));
    assert!(!service.delete_task(&task.id));

    let missing = TaskId::from("task_gone");
    let err = service
        .update_task(&missing, TaskPatch::default())
        .expect_err("unknown id should fail");
    assert!(matches!(err, ServiceError::Store(StoreError::TaskNotFound(_))));
}

#[test]
fn failed_persist_keeps_in_memory_state_usable() {
    let mut service = TaskService::open(UnavailableRepo);
    assert!(service.store().is_empty());

    service.import_document(PLAN, "plan.md");
    let err = service.persist().expect_err("persist should fail");
    assert!(matches!(err, ServiceError::Repo(_)));

    assert_eq!(service.store().len(), 2);
    service.add_task(TaskCandidate::manual("still works"));
    assert_eq!(service.store().len(), 3);
}

#[test]
fn corrupt_stored_snapshot_starts_empty() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    conn.execute(
        "INSERT INTO task_snapshots (key, version, payload, task_count, saved_at)
         VALUES (?1, '1.0', 'garbage', 0, 0);",
        params![DEFAULT_SNAPSHOT_KEY],
    )
    .expect("raw snapshot row should insert");

    let service = TaskService::open(SqliteSnapshotRepository::new(&conn));
    assert!(service.store().is_empty());
}

#[test]
fn snapshot_import_and_export_via_service() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    let mut source = TaskService::open(SqliteSnapshotRepository::with_key(&conn, "a"));
    source.import_document(PLAN, "plan.md");
    let json = source.export_snapshot_json().expect("snapshot should serialize");

    let mut target = TaskService::with_store(
        SqliteSnapshotRepository::with_key(&conn, "b"),
        TaskStore::new(),
    );
    assert_eq!(target.import_snapshot_json(&json).expect("snapshot should import"), 2);
    assert_eq!(target.store().tasks(), source.store().tasks());

    let err = target.import_snapshot_json(r#"{"items": []}"#)
        .expect_err("payload without tasks should be rejected");
    assert!(matches!(err, ServiceError::Snapshot(_)));
    assert_eq!(target.store().len(), 2);
}

#[test]
fn checklist_export_uses_query_and_refuses_empty_sets() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    let mut service = TaskService::open(SqliteSnapshotRepository::new(&conn));
    service.import_document(PLAN, "plan.md");
    let date = NaiveDate::from_ymd_opt(2026, 1, 2).expect("export date should be valid");

    let pending = TaskQuery {
        status: Some(TaskStatus::Pending),
        ..TaskQuery::default()
    };
    let rendered = service.export_checklist(&pending, date).expect("checklist should render");
    assert!(rendered.contains("- [ ] Write docs\n"));
    assert!(!rendered.contains("Init repo"));

    let nothing = TaskQuery {
        search: Some("no such task".to_string()),
        ..TaskQuery::default()
    };
    let err = service.export_checklist(&nothing, date)
        .expect_err("empty set should be refused");
    assert!(matches!(err, ServiceError::Export(ExportError::EmptyExportSet)));
}
