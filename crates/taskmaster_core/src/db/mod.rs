//! Snapshot database bootstrap.
//!
//! # Responsibility
//! - Open the SQLite file (or memory database) that holds task snapshots.
//! - Bring its schema up to date and refuse stores written by newer builds.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A connection is only handed out after migrations and the stored
//!   snapshot format check both pass.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or preparing the snapshot database.
#[derive(Debug)]
pub enum DbError {
    /// The database at `target` (a path, or `memory`) could not be opened.
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// Migration `version` (`name`) failed and was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The file was migrated by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A stored snapshot uses a format major version this build cannot read.
    UnsupportedSnapshotFormat {
        key: String,
        version: String,
        supported: &'static str,
    },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => {
                write!(f, "cannot open snapshot database `{target}`: {source}")
            }
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "snapshot schema migration {version} ({name}) failed: {source}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "snapshot database schema {db_version} was written by a newer build (this build knows up to {latest_supported})"
            ),
            Self::UnsupportedSnapshotFormat {
                key,
                version,
                supported,
            } => write!(
                f,
                "stored snapshot `{key}` has format {version}; this build reads format {supported}"
            ),
            Self::Sqlite(err) => write!(f, "snapshot database error: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::UnsupportedSnapshotFormat { .. } => {
                None
            }
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
