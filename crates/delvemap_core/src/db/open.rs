//! Snapshot store connections.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout.
//! - Returned connections are at `migrations::latest_version()`.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const IN_MEMORY_LOCATION: &str = ":memory:";

/// Opens (creating when missing) the snapshot database file at `path`.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and schema version.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_store("file", &path.display().to_string(), || Connection::open(path))
}

/// Opens a throwaway in-memory snapshot store.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_store("memory", IN_MEMORY_LOCATION, Connection::open_in_memory)
}

fn open_store(
    mode: &str,
    location: &str,
    opener: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = opener()
        .and_then(|conn| configure(&conn).map(|()| conn))
        .map_err(|source| DbError::Open {
            location: location.to_string(),
            source,
        })
        .and_then(|mut conn| apply_migrations(&mut conn).map(|version| (conn, version)));

    match result {
        Ok((conn, version)) => {
            info!(
                "event=db_open module=db status=ok mode={} schema_version={} duration_ms={}",
                mode,
                version,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)
}
