//! Versioned schema for the snapshot store.
//!
//! # Invariants
//! - Steps are listed in strictly increasing `version` order starting at 1.
//! - A step and its `user_version` bump commit together, so a failed step
//!   leaves the schema at the last completed version.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "map_snapshots",
    sql: include_str!("0001_init.sql"),
}];

/// Newest schema version this build can read and write.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings the schema up to `latest_version`, returning the version reached.
///
/// # Errors
/// - `SchemaTooNew` when the file comes from a newer build; nothing runs.
/// - `Migration` naming the first step that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<u32> {
    let found = current_user_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    for step in SCHEMA_STEPS.iter().filter(|step| step.version > found) {
        run_step(conn, step).map_err(|source| DbError::Migration {
            version: step.version,
            name: step.name,
            source,
        })?;
        info!(
            "event=db_migrate module=db status=ok version={} step={}",
            step.version, step.name
        );
    }
    Ok(supported)
}

/// Schema version recorded in the open database.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn run_step(conn: &mut Connection, step: &SchemaStep) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(step.sql)?;
    tx.pragma_update(None, "user_version", step.version)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::{latest_version, SCHEMA_STEPS};

    #[test]
    fn steps_are_numbered_from_one_without_gaps() {
        for (index, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
        assert_eq!(latest_version() as usize, SCHEMA_STEPS.len());
    }
}
