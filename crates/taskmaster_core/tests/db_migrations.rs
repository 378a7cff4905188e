use rusqlite::{params, Connection};
use taskmaster_core::db::migrations::latest_version;
use taskmaster_core::db::{open_db, open_db_in_memory, DbError};
use taskmaster_core::SNAPSHOT_VERSION;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().expect("in-memory db should open");

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "task_snapshots");
}

#[test]
fn reopening_file_database_is_idempotent() {
    let dir = tempfile::tempdir().expect("temp dir should be creatable");
    let path = dir.path().join("taskmaster.sqlite3");

    let first = open_db(&path).expect("first open should succeed");
    assert_eq!(schema_version(&first), latest_version());
    drop(first);

    let second = open_db(&path).expect("reopen should succeed");
    assert_eq!(schema_version(&second), latest_version());
    assert_table_exists(&second, "task_snapshots");
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir should be creatable");
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).expect("raw sqlite open should succeed");
    conn.execute_batch("PRAGMA user_version = 999;")
        .expect("user_version should be writable");
    drop(conn);

    match open_db(&path).expect_err("newer schema should be refused") {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unopenable_path_is_named_in_the_error() {
    let dir = tempfile::tempdir().expect("temp dir should be creatable");
    let path = dir.path().join("missing").join("nested").join("db.sqlite3");

    let err = open_db(&path).expect_err("missing parent directory should fail");
    match &err {
        DbError::Open { target, .. } => assert_eq!(target, &path.display().to_string()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("db.sqlite3"));
}

#[test]
fn stored_snapshot_with_newer_major_format_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir should be creatable");
    let path = dir.path().join("taskmaster.sqlite3");
    store_raw_snapshot(&path, "taskMasterData", "2.0");

    match open_db(&path).expect_err("newer snapshot format should be refused") {
        DbError::UnsupportedSnapshotFormat {
            key,
            version,
            supported,
        } => {
            assert_eq!(key, "taskMasterData");
            assert_eq!(version, "2.0");
            assert_eq!(supported, SNAPSHOT_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn stored_snapshot_with_same_major_format_opens() {
    let dir = tempfile::tempdir().expect("temp dir should be creatable");
    let path = dir.path().join("taskmaster.sqlite3");
    store_raw_snapshot(&path, "taskMasterData", "1.7");

    open_db(&path).expect("minor format difference should be accepted");
}

fn store_raw_snapshot(path: &std::path::Path, key: &str, version: &str) {
    let conn = open_db(path).expect("db should open");
    conn.execute(
        "INSERT INTO task_snapshots (key, version, payload, task_count, saved_at)
         VALUES (?1, ?2, '{\"tasks\": []}', 0, 0);",
        params![key, version],
    )
    .expect("raw snapshot row should insert");
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .expect("user_version should be readable")
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .expect("sqlite_master should be queryable");
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
