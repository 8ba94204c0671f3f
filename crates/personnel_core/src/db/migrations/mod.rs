//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register the employee schema steps in version order.
//! - Bring a connection from its recorded version up to the latest one
//!   inside a single transaction.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Migrations are idempotent (`IF NOT EXISTS`) so re-running on a
//!   partially bootstrapped file is harmless.

use crate::db::{DbError, DbResult};
use log::{debug, info, warn};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("0001_employees.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("0002_manager_index.sql"),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
///
/// Returns the number of steps applied; zero when the schema is current.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let from_version = current_user_version(conn)?;
    let target = latest_version();

    if from_version > target {
        warn!(
            "event=db_migrate module=db status=error db_version={from_version} latest={target}"
        );
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: target,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect();
    if pending.is_empty() {
        debug!("event=db_migrate module=db status=current version={from_version}");
        return Ok(0);
    }

    debug!("event=db_migrate module=db status=start from={from_version} to={target}");
    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;
    info!(
        "event=db_migrate module=db status=ok from={from_version} to={target} steps={}",
        pending.len()
    );

    Ok(pending.len())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
