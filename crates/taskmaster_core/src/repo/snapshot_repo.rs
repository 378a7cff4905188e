//! Snapshot repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Save and load the whole-store snapshot blob under a stable key.
//!
//! # Invariants
//! - Save is an upsert: one row per key, last write wins.
//! - A stored payload that fails validation surfaces as an error, never as
//!   a partially loaded snapshot.

use crate::db::DbError;
use crate::export::snapshot::{Snapshot, SnapshotError};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key used when none is configured.
pub const DEFAULT_SNAPSHOT_KEY: &str = "taskMasterData";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for snapshot persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Snapshot(SnapshotError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted snapshot data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SnapshotError> for RepoError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

/// Storage collaborator for whole-store snapshots.
pub trait SnapshotRepository {
    /// Returns the stored snapshot, or `None` when nothing was saved yet.
    fn load_snapshot(&self) -> RepoResult<Option<Snapshot>>;
    /// Stores `snapshot`, replacing any previous one.
    fn save_snapshot(&self, snapshot: &Snapshot) -> RepoResult<()>;
}

/// SQLite-backed snapshot repository keyed by name.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
    key: String,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    /// Uses `DEFAULT_SNAPSHOT_KEY` on a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_key(conn, DEFAULT_SNAPSHOT_KEY)
    }

    pub fn with_key(conn: &'conn Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn load_snapshot(&self) -> RepoResult<Option<Snapshot>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM task_snapshots WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(payload) => Ok(Some(Snapshot::from_json(&payload)?)),
            None => Ok(None),
        }
    }

    fn save_snapshot(&self, snapshot: &Snapshot) -> RepoResult<()> {
        let payload = snapshot.to_json()?;
        let task_count = i64::try_from(snapshot.tasks.len()).map_err(|_| {
            RepoError::InvalidData(format!("task count {} overflows", snapshot.tasks.len()))
        })?;

        self.conn.execute(
            "INSERT INTO task_snapshots (key, version, payload, task_count, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(key) DO UPDATE SET
                version = excluded.version,
                payload = excluded.payload,
                task_count = excluded.task_count,
                saved_at = excluded.saved_at;",
            params![
                self.key.as_str(),
                snapshot.version.as_str(),
                payload,
                task_count,
                snapshot.last_updated.timestamp_millis(),
            ],
        )?;

        Ok(())
    }
}
