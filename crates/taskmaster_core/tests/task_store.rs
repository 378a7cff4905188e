use std::collections::HashSet;
use taskmaster_core::{
    fingerprint, SortColumn, SortDirection, StoreError, TaskCandidate, TaskCategory, TaskId,
    TaskPatch, TaskQuery, TaskSort, TaskStatus, TaskStore, MANUAL_SOURCE,
};

fn seeded_store() -> TaskStore {
    let mut store = TaskStore::new();
    store.insert(
        TaskCandidate::manual("Set up project structure")
            .with_status(TaskStatus::Completed)
            .with_source("sample")
            .with_notes("Initial project setup with basic folders and files."),
    );
    store.insert(
        TaskCandidate::manual("Fix authentication bug")
            .with_status(TaskStatus::InProgress)
            .with_category(TaskCategory::Bug)
            .with_source("sample")
            .with_notes("Users are unable to log in with valid credentials."),
    );
    store.insert(
        TaskCandidate::manual("Write unit tests for API")
            .with_category(TaskCategory::Testing)
            .with_source("plan.md"),
    );
    store.insert(
        TaskCandidate::manual("Update documentation").with_category(TaskCategory::Documentation),
    );
    store
}

#[test]
fn insert_assigns_identity_checksum_and_timestamps() {
    let mut store = TaskStore::new();
    let task = store.insert(TaskCandidate::manual("  Fix Bug!  ")).clone();

    assert!(task.id.as_str().starts_with("task_"));
    assert_eq!(task.title, "Fix Bug!");
    assert_eq!(task.checksum, fingerprint("fixbug"));
    assert_eq!(task.date_added, task.last_updated);
    assert_eq!(task.source, MANUAL_SOURCE);
    assert_eq!(task.original_line, None);
    assert!(task.validate().is_ok());
}

#[test]
fn insert_preserves_order_and_unique_ids() {
    let store = seeded_store();
    let titles: Vec<_> = store.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Set up project structure",
            "Fix authentication bug",
            "Write unit tests for API",
            "Update documentation",
        ]
    );

    let ids: HashSet<_> = store.iter().map(|task| task.id.clone()).collect();
    assert_eq!(ids.len(), store.len());
}

#[test]
fn update_merges_only_given_fields() {
    let mut store = seeded_store();
    let original = store.tasks()[2].clone();

    let updated = store
        .update(
            &original.id,
            TaskPatch {
                title: Some("  Write integration tests ".to_string()),
                status: Some(TaskStatus::Completed),
                ..TaskPatch::default()
            },
        )
        .expect("task should exist")
        .clone();

    assert_eq!(updated.title, "Write integration tests");
    assert_eq!(updated.checksum, "writeintegrationtests");
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(updated.category, original.category);
    assert_eq!(updated.notes, original.notes);
    assert_eq!(updated.source, original.source);
    assert_eq!(updated.date_added, original.date_added);
    assert!(updated.last_updated >= original.last_updated);
}

#[test]
fn update_and_toggle_unknown_id_return_not_found() {
    let mut store = seeded_store();
    let missing = TaskId::from("task_missing");

    let err = store
        .update(&missing, TaskPatch::default())
        .expect_err("unknown id should fail");
    assert_eq!(err, StoreError::TaskNotFound(missing.clone()));
    assert!(matches!(
        store.toggle_status(&missing),
        Err(StoreError::TaskNotFound(_))
    ));
}

#[test]
fn delete_reports_whether_record_existed() {
    let mut store = seeded_store();
    let id = store.tasks()[0].id.clone();

    assert!(store.delete(&id));
    assert!(!store.delete(&id));
    assert_eq!(store.len(), 3);
    assert!(store.get(&id).is_none());
}

#[test]
fn toggle_completes_and_reopens() {
    let mut store = seeded_store();
    let id = store.tasks()[1].id.clone();

    assert_eq!(store.toggle_status(&id).expect("task should exist").status, TaskStatus::Completed);
    assert_eq!(store.toggle_status(&id).expect("task should exist").status, TaskStatus::Pending);
}

#[test]
fn fingerprint_lookup_requires_matching_source() {
    let store = seeded_store();
    let key = fingerprint("fix authentication BUG");

    assert!(store.find_by_fingerprint_and_source(&key, "sample").is_some());
    assert!(store.find_by_fingerprint_and_source(&key, "plan.md").is_none());
}

#[test]
fn query_filters_by_search_status_and_category() {
    let store = seeded_store();

    let by_search = store.query(&TaskQuery {
        search: Some("  CREDENTIALS ".to_string()),
        ..TaskQuery::default()
    });
    assert_eq!(by_search.len(), 1);
    assert_eq!(by_search[0].title, "Fix authentication bug");

    let by_source = store.query(&TaskQuery {
        search: Some("plan.md".to_string()),
        ..TaskQuery::default()
    });
    assert_eq!(by_source.len(), 1);

    let pending_docs = store.query(&TaskQuery {
        status: Some(TaskStatus::Pending),
        category: Some(TaskCategory::Documentation),
        ..TaskQuery::default()
    });
    assert_eq!(pending_docs.len(), 1);
    assert_eq!(pending_docs[0].title, "Update documentation");

    assert_eq!(store.query(&TaskQuery::default()).len(), 4);
}

#[test]
fn query_sorts_by_column_and_direction() {
    let store = seeded_store();

    let ascending = store.query(&TaskQuery {
        sort: Some(TaskSort {
            column: SortColumn::Title,
            direction: SortDirection::Ascending,
        }),
        ..TaskQuery::default()
    });
    assert_eq!(ascending[0].title, "Fix authentication bug");
    assert_eq!(ascending[3].title, "Write unit tests for API");

    let by_status_desc = store.query(&TaskQuery {
        sort: Some(TaskSort {
            column: SortColumn::Status,
            direction: SortDirection::Descending,
        }),
        ..TaskQuery::default()
    });
    let statuses: Vec<_> = by_status_desc.iter().map(|task| task.status).collect();
    assert_eq!(
        statuses,
        vec![
            TaskStatus::Pending,
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
        ]
    );
}

#[test]
fn stats_count_statuses_bugs_and_rate() {
    let store = seeded_store();
    let stats = store.stats();

    assert_eq!(stats.total, 4);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.bugs, 1);
    assert_eq!(stats.completion_rate, 25);

    assert_eq!(TaskStore::new().stats().completion_rate, 0);
}
