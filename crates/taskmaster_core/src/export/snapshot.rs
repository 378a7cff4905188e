//! JSON snapshot interchange format.
//!
//! # Responsibility
//! - Capture the full store with recomputed metadata.
//! - Validate and load snapshots produced by this crate or by older tools.
//!
//! # Invariants
//! - Import requires a top-level `tasks` array; anything else is
//!   `InvalidFormat`.
//! - Incoming `metadata` is ignored and recomputed.
//! - Checksums are re-derived from titles on import.
//! - Ids must be unique and timestamps ordered, or the import is rejected.

use crate::model::task::Task;
use crate::parser::fingerprint::fingerprint;
use crate::store::task_store::TaskStore;
use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0";

pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Debug)]
pub enum SnapshotError {
    /// Input is not a snapshot (no `tasks` array, or an unreadable record).
    InvalidFormat(String),
    Serialize(serde_json::Error),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(message) => write!(f, "invalid snapshot format: {message}"),
            Self::Serialize(err) => write!(f, "failed to serialize snapshot: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidFormat(_) => None,
            Self::Serialize(err) => Some(err),
        }
    }
}

/// Derived counters, recomputed whenever a snapshot is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Distinct sources in first-seen order.
    pub sources: Vec<String>,
}

impl SnapshotMetadata {
    fn from_tasks(tasks: &[Task]) -> Self {
        let mut sources: Vec<String> = Vec::new();
        for task in tasks {
            if !sources.contains(&task.source) {
                sources.push(task.source.clone());
            }
        }
        Self {
            total_tasks: tasks.len(),
            completed_tasks: tasks
                .iter()
                .filter(|task| task.is_completed())
                .count(),
            sources,
        }
    }
}

/// Canonical lossless representation of the whole task collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    pub tasks: Vec<Task>,
    pub metadata: SnapshotMetadata,
}

impl Snapshot {
    /// Captures the store as of now.
    pub fn capture(store: &TaskStore) -> Self {
        let tasks = store.tasks().to_vec();
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            last_updated: Utc::now(),
            metadata: SnapshotMetadata::from_tasks(&tasks),
            tasks,
        }
    }

    /// Serializes as pretty-printed JSON.
    pub fn to_json(&self) -> SnapshotResult<String> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::Serialize)
    }

    /// Parses and validates snapshot JSON.
    ///
    /// # Errors
    /// - `InvalidFormat` when the text is not JSON, has no `tasks` array, or
    ///   any task record is unreadable or violates record invariants.
    pub fn from_json(text: &str) -> SnapshotResult<Self> {
        let root: Value = serde_json::from_str(text)
            .map_err(|err| SnapshotError::InvalidFormat(format!("not valid JSON: {err}")))?;
        let Some(raw_tasks) = root.get("tasks").and_then(Value::as_array) else {
            return Err(SnapshotError::InvalidFormat(
                "missing `tasks` array".to_string(),
            ));
        };

        let mut tasks = Vec::with_capacity(raw_tasks.len());
        let mut ids = HashSet::with_capacity(raw_tasks.len());
        for (index, raw) in raw_tasks.iter().enumerate() {
            let mut task: Task = serde_json::from_value(raw.clone()).map_err(|err| {
                SnapshotError::InvalidFormat(format!("task #{index} is unreadable: {err}"))
            })?;
            task.validate().map_err(|err| {
                SnapshotError::InvalidFormat(format!("task #{index} is invalid: {err}"))
            })?;
            if !ids.insert(task.id.clone()) {
                return Err(SnapshotError::InvalidFormat(format!(
                    "task #{index} reuses id `{}`",
                    task.id
                )));
            }
            task.checksum = fingerprint(&task.title);
            tasks.push(task);
        }

        let version = root
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(SNAPSHOT_VERSION)
            .to_string();
        let last_updated = root
            .get("lastUpdated")
            .and_then(Value::as_str)
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            .map_or_else(Utc::now, |value| value.with_timezone(&Utc));

        Ok(Self {
            version,
            last_updated,
            metadata: SnapshotMetadata::from_tasks(&tasks),
            tasks,
        })
    }

    /// Converts into a store holding exactly the snapshot tasks.
    pub fn into_store(self) -> TaskStore {
        TaskStore::from_tasks(self.tasks)
    }
}

/// Serializes the whole store as snapshot JSON.
pub fn export_snapshot(store: &TaskStore) -> SnapshotResult<String> {
    let json = Snapshot::capture(store).to_json()?;
    info!(
        "event=snapshot_export module=export status=ok tasks={}",
        store.len()
    );
    Ok(json)
}

/// Replaces the store contents with the tasks from snapshot JSON.
///
/// Returns the number of imported tasks. On error the store is untouched.
pub fn import_snapshot(text: &str, store: &mut TaskStore) -> SnapshotResult<usize> {
    let snapshot = match Snapshot::from_json(text) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!("event=snapshot_import module=export status=error error={err}");
            return Err(err);
        }
    };
    let count = snapshot.tasks.len();
    store.replace_all(snapshot.tasks);
    info!("event=snapshot_import module=export status=ok tasks={count}");
    Ok(count)
}

/// Default download name for a snapshot exported on `date`.
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("task_master_{}.json", date.format("%Y-%m-%d"))
}
