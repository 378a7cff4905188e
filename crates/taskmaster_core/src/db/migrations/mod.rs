//! Snapshot schema migrations and stored-format check.
//!
//! # Invariants
//! - `MIGRATIONS` is ordered by strictly increasing `version`.
//! - Pending steps share one transaction; `user_version` only moves when
//!   every step succeeded.
//! - Stored snapshots must share the major format version of
//!   `SNAPSHOT_VERSION`; minor differences are read as-is.

use crate::db::{DbError, DbResult};
use crate::export::snapshot::SNAPSHOT_VERSION;
use log::{error, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "task_snapshots",
    sql: include_str!("0001_task_snapshots.sql"),
}];

/// Returns the schema version this build migrates to.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the snapshot schema up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is ahead of this build.
/// - `Migration` naming the step that failed; nothing is committed then.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .skip_while(|migration| migration.version <= from_version)
        .collect();
    let Some(last) = pending.last() else {
        return Ok(());
    };
    let to_version = last.version;

    let tx = conn.transaction()?;
    for migration in pending {
        tx.execute_batch(migration.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", migration.version))
            .map_err(|source| {
                error!(
                    "event=db_migrate module=db status=error version={} name={}",
                    migration.version, migration.name
                );
                DbError::Migration {
                    version: migration.version,
                    name: migration.name,
                    source,
                }
            })?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={to_version}");
    Ok(())
}

/// Rejects databases holding a snapshot in a newer major format.
///
/// Unparseable versions are left to payload validation at load time.
///
/// # Errors
/// - `UnsupportedSnapshotFormat` naming the first offending key.
pub fn verify_snapshot_formats(conn: &Connection) -> DbResult<()> {
    let supported_major = format_major(SNAPSHOT_VERSION);
    let mut stmt = conn.prepare("SELECT key, version FROM task_snapshots ORDER BY key;")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

    for row in rows {
        let (key, version) = row?;
        let newer = match (format_major(&version), supported_major) {
            (Some(stored), Some(supported)) => stored > supported,
            _ => false,
        };
        if newer {
            return Err(DbError::UnsupportedSnapshotFormat {
                key,
                version,
                supported: SNAPSHOT_VERSION,
            });
        }
    }
    Ok(())
}

fn format_major(version: &str) -> Option<u32> {
    version.trim().split('.').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::format_major;

    #[test]
    fn format_major_reads_leading_component() {
        assert_eq!(format_major("1.0"), Some(1));
        assert_eq!(format_major(" 2 "), Some(2));
        assert_eq!(format_major("v3"), None);
        assert_eq!(format_major(""), None);
    }
}
