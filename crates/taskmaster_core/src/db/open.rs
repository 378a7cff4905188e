//! Connection bootstrap for the snapshot database.
//!
//! # Invariants
//! - Returned connections have a busy timeout, current migrations and only
//!   snapshots in a readable format.
//! - Errors name the target path (or `memory`).
//! - Every open emits a `db_open` start event and one ok/error event.

use super::migrations::{apply_migrations, verify_snapshot_formats};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MEMORY_TARGET: &str = "memory";

/// Opens (or creates) the snapshot database file at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with(path.display().to_string(), || Connection::open(path))
}

/// Opens a private in-memory snapshot database.
///
/// Mainly used by tests and one-shot conversions.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with(MEMORY_TARGET.to_string(), Connection::open_in_memory)
}

fn open_with(
    target: String,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start target={target}");

    let mut conn = match connect() {
        Ok(conn) => conn,
        Err(source) => {
            error!(
                "event=db_open module=db status=error target={target} duration_ms={} error_code=db_open_failed error={source}",
                started_at.elapsed().as_millis()
            );
            return Err(DbError::Open { target, source });
        }
    };

    if let Err(err) = prepare_snapshot_store(&mut conn) {
        error!(
            "event=db_open module=db status=error target={target} duration_ms={} error_code=db_prepare_failed error={err}",
            started_at.elapsed().as_millis()
        );
        return Err(err);
    }

    info!(
        "event=db_open module=db status=ok target={target} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn prepare_snapshot_store(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    verify_snapshot_formats(conn)
}
