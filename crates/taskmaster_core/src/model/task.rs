//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted `Task` record and its unpersisted `TaskCandidate`.
//! - Define closed status/category enums and the partial update shape.
//!
//! # Invariants
//! - `id` is non-empty and never reused for another task.
//! - `last_updated` is never earlier than `date_added`.
//! - Wire names follow the snapshot interchange format (`camelCase`,
//!   `in-progress`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Source name used for tasks entered directly instead of parsed from text.
pub const MANUAL_SOURCE: &str = "manual";

const TASK_ID_PREFIX: &str = "task_";

/// Opaque stable task identifier.
///
/// Kept as a string so ids produced by other tools survive snapshot import.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh id from a UUIDv7 (millisecond clock + random bits).
    pub fn generate() -> Self {
        Self(format!("{TASK_ID_PREFIX}{}", Uuid::now_v7().simple()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started.
    Pending,
    /// Work has started.
    InProgress,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// Returns the wire name used in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Returns the status a single toggle action moves to.
    ///
    /// Completed tasks reopen as pending; everything else completes.
    pub fn toggled(self) -> Self {
        match self {
            Self::Completed => Self::Pending,
            Self::Pending | Self::InProgress => Self::Completed,
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in-progress" | "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!(
                "unsupported task status `{other}`; expected pending|in-progress|completed"
            )),
        }
    }
}

/// Inferred task category.
///
/// Inference is a hint only; once set, the category is whatever the record says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Feature,
    Bug,
    Testing,
    Documentation,
}

impl TaskCategory {
    /// Returns the wire name used in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Bug => "bug",
            Self::Testing => "testing",
            Self::Documentation => "documentation",
        }
    }
}

impl Display for TaskCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "feature" => Ok(Self::Feature),
            "bug" => Ok(Self::Bug),
            "testing" => Ok(Self::Testing),
            "documentation" => Ok(Self::Documentation),
            other => Err(format!(
                "unsupported task category `{other}`; expected feature|bug|testing|documentation"
            )),
        }
    }
}

/// Validation errors for persisted task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyId,
    TimestampOrder {
        date_added: DateTime<Utc>,
        last_updated: DateTime<Utc>,
    },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id must not be empty"),
            Self::TimestampOrder {
                date_added,
                last_updated,
            } => write!(
                f,
                "lastUpdated ({}) must be >= dateAdded ({})",
                last_updated.to_rfc3339(),
                date_added.to_rfc3339()
            ),
        }
    }
}

impl Error for TaskValidationError {}

/// Persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Assigned on insert, immutable afterwards.
    pub id: TaskId,
    /// Display title, trimmed.
    pub title: String,
    pub status: TaskStatus,
    pub category: TaskCategory,
    /// Originating document name, or `manual`.
    pub source: String,
    /// Append-only across reconciliation merges.
    #[serde(default)]
    pub notes: String,
    pub date_added: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// 1-based line in the source document; `None` for manual tasks.
    #[serde(default)]
    pub original_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_number: Option<String>,
    /// Title fingerprint used for duplicate matching.
    #[serde(default)]
    pub checksum: String,
}

impl Task {
    /// Checks record-level invariants.
    ///
    /// # Errors
    /// - `EmptyId` when `id` is blank.
    /// - `TimestampOrder` when `last_updated < date_added`.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.last_updated < self.date_added {
            return Err(TaskValidationError::TimestampOrder {
                date_added: self.date_added,
                last_updated: self.last_updated,
            });
        }
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Unpersisted task, produced by the document parser or by direct input.
///
/// Has no identity or timestamps until the store promotes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCandidate {
    pub title: String,
    pub status: TaskStatus,
    pub category: TaskCategory,
    pub source: String,
    pub notes: String,
    pub original_line: Option<u32>,
    pub section: Option<String>,
    pub phase: Option<String>,
    pub task_number: Option<String>,
}

impl TaskCandidate {
    /// Creates a manually entered candidate: pending, feature, source `manual`.
    pub fn manual(title: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
            status: TaskStatus::Pending,
            category: TaskCategory::Feature,
            source: MANUAL_SOURCE.to_string(),
            notes: String::new(),
            original_line: None,
            section: None,
            phase: None,
            task_number: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Partial update applied by `TaskStore::update`.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
    pub notes: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.category.is_none()
            && self.notes.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskCategory, TaskId, TaskStatus};

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let first = TaskId::generate();
        let second = TaskId::generate();
        assert!(first.as_str().starts_with("task_"));
        assert_ne!(first, second);
    }

    #[test]
    fn status_parses_wire_and_snake_names() {
        assert_eq!("In-Progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("in_progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn toggle_reopens_completed_and_completes_the_rest() {
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::Pending);
        assert_eq!(TaskStatus::InProgress.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::Pending.toggled(), TaskStatus::Completed);
    }

    #[test]
    fn category_round_trips_through_str() {
        for category in [
            TaskCategory::Feature,
            TaskCategory::Bug,
            TaskCategory::Testing,
            TaskCategory::Documentation,
        ] {
            assert_eq!(category.as_str().parse::<TaskCategory>(), Ok(category));
        }
    }
}
