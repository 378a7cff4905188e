//! Core engine for the Task Master checklist tracker.
//! Parses checklist documents, reconciles them into a task store and
//! serializes the store; hosts supply text in and persist snapshots out.

pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod parser;
pub mod reconcile;
pub mod repo;
pub mod service;
pub mod store;

pub use export::checklist::{
    checklist_file_name, group_by_phase_and_task, render_checklist, ExportError, PhaseGroup,
    TaskGroup,
};
pub use export::snapshot::{
    export_snapshot, import_snapshot, snapshot_file_name, Snapshot, SnapshotError,
    SnapshotMetadata, SNAPSHOT_VERSION,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{
    Task, TaskCandidate, TaskCategory, TaskId, TaskPatch, TaskStatus, TaskValidationError,
    MANUAL_SOURCE,
};
pub use parser::category::categorize;
pub use parser::document::parse_document;
pub use parser::fingerprint::fingerprint;
pub use reconcile::{reconcile, ReconcileSummary};
pub use repo::snapshot_repo::{
    RepoError, RepoResult, SnapshotRepository, SqliteSnapshotRepository, DEFAULT_SNAPSHOT_KEY,
};
pub use service::task_service::{ServiceError, ServiceResult, TaskService};
pub use store::query::{SortColumn, SortDirection, TaskQuery, TaskSort, TaskStats};
pub use store::task_store::{StoreError, StoreResult, TaskStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
