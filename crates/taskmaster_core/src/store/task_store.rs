//! Ordered task store.
//!
//! # Responsibility
//! - Promote candidates into persisted tasks (id, checksum, timestamps).
//! - Apply partial updates and deletions by id.
//!
//! # Invariants
//! - Ids are unique for the lifetime of the store.
//! - `checksum == fingerprint(title)` after every insert/update.
//! - `last_updated >= date_added`, and `last_updated` never moves backwards.

use crate::model::task::{Task, TaskCandidate, TaskId, TaskPatch};
use crate::parser::fingerprint::fingerprint;
use chrono::Utc;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level lookup failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    TaskNotFound(TaskId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
        }
    }
}

impl Error for StoreError {}

/// Owned, insertion-ordered task collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from already-validated records, keeping their order.
    pub(crate) fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns all tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Promotes a candidate into a persisted task appended at the end.
    ///
    /// # Contract
    /// - Assigns a fresh id.
    /// - Trims the title and derives its checksum.
    /// - Sets `date_added == last_updated == now`.
    pub fn insert(&mut self, candidate: TaskCandidate) -> &Task {
        let now = Utc::now();
        let title = candidate.title.trim().to_string();
        let checksum = fingerprint(&title);

        let mut id = TaskId::generate();
        while self.get(&id).is_some() {
            id = TaskId::generate();
        }

        self.tasks.push(Task {
            id,
            title,
            status: candidate.status,
            category: candidate.category,
            source: candidate.source,
            notes: candidate.notes,
            date_added: now,
            last_updated: now,
            original_line: candidate.original_line,
            section: candidate.section,
            phase: candidate.phase,
            task_number: candidate.task_number,
            checksum,
        });

        &self.tasks[self.tasks.len() - 1]
    }

    /// Merges `patch` into the task with `id` and refreshes `last_updated`.
    ///
    /// Fields left as `None` in the patch stay untouched.
    ///
    /// # Errors
    /// - `TaskNotFound` when no task has this id.
    pub fn update(&mut self, id: &TaskId, patch: TaskPatch) -> StoreResult<&Task> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?;
        Ok(self.update_at(index, patch))
    }

    pub(crate) fn update_at(&mut self, index: usize, patch: TaskPatch) -> &Task {
        let task = &mut self.tasks[index];
        if let Some(title) = patch.title {
            task.title = title.trim().to_string();
            task.checksum = fingerprint(&task.title);
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(category) = patch.category {
            task.category = category;
        }
        if let Some(notes) = patch.notes {
            task.notes = notes;
        }
        task.last_updated = Utc::now().max(task.last_updated);
        task
    }

    /// Flips completion state: completed reopens as pending, others complete.
    ///
    /// # Errors
    /// - `TaskNotFound` when no task has this id.
    pub fn toggle_status(&mut self, id: &TaskId) -> StoreResult<&Task> {
        let current = self
            .get(id)
            .map(|task| task.status)
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?;
        self.update(
            id,
            TaskPatch {
                status: Some(current.toggled()),
                ..TaskPatch::default()
            },
        )
    }

    /// Removes the task with `id`; returns whether it existed.
    pub fn delete(&mut self, id: &TaskId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Finds the duplicate-matching task: same fingerprint and same source.
    pub fn find_by_fingerprint_and_source(&self, fingerprint: &str, source: &str) -> Option<&Task> {
        self.position_by_fingerprint_and_source(fingerprint, source)
            .map(|index| &self.tasks[index])
    }

    pub(crate) fn position_by_fingerprint_and_source(
        &self,
        fingerprint: &str,
        source: &str,
    ) -> Option<usize> {
        self.tasks
            .iter()
            .position(|task| task.checksum == fingerprint && task.source == source)
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| &task.id == id)
    }

    /// Replaces the whole collection with already-validated records.
    pub(crate) fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }
}
