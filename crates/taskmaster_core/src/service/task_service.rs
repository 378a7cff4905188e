//! Task use-case service.
//!
//! # Responsibility
//! - Own the in-memory `TaskStore` and its storage collaborator.
//! - Provide document import, CRUD, snapshot and checklist entry points.
//!
//! # Invariants
//! - Mutating calls never persist implicitly; callers invoke `persist`
//!   after a batch of mutations.
//! - A failed `persist` leaves the in-memory store fully usable.
//! - Mutations take `&mut self`, so reconciliation passes are serialized.

use crate::export::checklist::{render_checklist, ExportError};
use crate::export::snapshot::{import_snapshot, Snapshot, SnapshotError};
use crate::model::task::{Task, TaskCandidate, TaskId, TaskPatch};
use crate::parser::document::parse_document;
use crate::reconcile::{reconcile, ReconcileSummary};
use crate::repo::snapshot_repo::{RepoError, SnapshotRepository};
use crate::store::query::{TaskQuery, TaskStats};
use crate::store::task_store::{StoreError, TaskStore};
use chrono::NaiveDate;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Update/toggle on an unknown id.
    Store(StoreError),
    /// Snapshot import/export failure.
    Snapshot(SnapshotError),
    /// Checklist export refused.
    Export(ExportError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "persistence failed: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<SnapshotError> for ServiceError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

impl From<ExportError> for ServiceError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Service facade over a task store and a snapshot repository.
pub struct TaskService<R: SnapshotRepository> {
    store: TaskStore,
    repo: R,
}

impl<R: SnapshotRepository> TaskService<R> {
    /// Creates a service seeded from the repository's stored snapshot.
    ///
    /// An unreadable stored snapshot is logged and the service starts empty.
    pub fn open(repo: R) -> Self {
        let store = match repo.load_snapshot() {
            Ok(Some(snapshot)) => {
                info!(
                    "event=store_load module=service status=ok tasks={}",
                    snapshot.tasks.len()
                );
                snapshot.into_store()
            }
            Ok(None) => {
                info!("event=store_load module=service status=ok tasks=0 reason=no_snapshot");
                TaskStore::new()
            }
            Err(err) => {
                error!(
                    "event=store_load module=service status=error error_code=snapshot_unreadable error={err}"
                );
                TaskStore::new()
            }
        };
        Self { store, repo }
    }

    /// Creates a service around an existing store without loading anything.
    pub fn with_store(repo: R, store: TaskStore) -> Self {
        Self { store, repo }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Parses one document and reconciles its candidates into the store.
    pub fn import_document(&mut self, text: &str, source_name: &str) -> ReconcileSummary {
        let started_at = Instant::now();
        let candidates = parse_document(text, source_name);
        let summary = reconcile(candidates, &mut self.store);
        info!(
            "event=document_import module=service status=ok source={} inserted={} updated={} unchanged={} duration_ms={}",
            source_name,
            summary.inserted,
            summary.updated,
            summary.unchanged,
            started_at.elapsed().as_millis()
        );
        summary
    }

    /// Inserts a manually entered task and returns the persisted record.
    pub fn add_task(&mut self, candidate: TaskCandidate) -> Task {
        let task = self.store.insert(candidate).clone();
        info!("event=task_add module=service status=ok id={}", task.id);
        task
    }

    pub fn update_task(&mut self, id: &TaskId, patch: TaskPatch) -> ServiceResult<Task> {
        match self.store.update(id, patch) {
            Ok(task) => Ok(task.clone()),
            Err(err) => {
                warn!("event=task_update module=service status=error id={id} error_code=task_not_found");
                Err(err.into())
            }
        }
    }

    pub fn toggle_task(&mut self, id: &TaskId) -> ServiceResult<Task> {
        Ok(self.store.toggle_status(id)?.clone())
    }

    /// Deletes a task; returns whether it existed.
    pub fn delete_task(&mut self, id: &TaskId) -> bool {
        let removed = self.store.delete(id);
        info!("event=task_delete module=service status=ok id={id} removed={removed}");
        removed
    }

    pub fn list_tasks(&self, query: &TaskQuery) -> Vec<&Task> {
        self.store.query(query)
    }

    pub fn stats(&self) -> TaskStats {
        self.store.stats()
    }

    pub fn export_snapshot_json(&self) -> ServiceResult<String> {
        Ok(Snapshot::capture(&self.store).to_json()?)
    }

    /// Replaces the store with a snapshot's tasks; the store is untouched on error.
    pub fn import_snapshot_json(&mut self, text: &str) -> ServiceResult<usize> {
        Ok(import_snapshot(text, &mut self.store)?)
    }

    /// Renders the filtered/sorted subset described by `query` as a checklist.
    pub fn export_checklist(&self, query: &TaskQuery, export_date: NaiveDate) -> ServiceResult<String> {
        Ok(render_checklist(self.store.query(query), export_date)?)
    }

    /// Saves a fresh snapshot of the store through the repository.
    ///
    /// # Errors
    /// - `Repo` when storage is unavailable; in-memory state is unaffected.
    pub fn persist(&self) -> ServiceResult<()> {
        let started_at = Instant::now();
        let snapshot = Snapshot::capture(&self.store);
        match self.repo.save_snapshot(&snapshot) {
            Ok(()) => {
                info!(
                    "event=store_persist module=service status=ok tasks={} duration_ms={}",
                    snapshot.tasks.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_persist module=service status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        }
    }
}
