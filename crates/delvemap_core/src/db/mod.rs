//! SQLite storage for saved map snapshots.
//!
//! # Responsibility
//! - Open the snapshot database and bring its schema up to date.
//! - Report open, schema and query failures with the store context attached.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - No snapshot is read or written before the schema is current.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening, upgrading or querying the snapshot store.
#[derive(Debug)]
pub enum DbError {
    /// The database could not be opened or configured.
    Open {
        location: String,
        source: rusqlite::Error,
    },
    /// A schema step failed; the schema stays at the previous version.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build of the snapshot store.
    SchemaTooNew { found: u32, supported: u32 },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { location, source } => {
                write!(f, "cannot open snapshot store at {location}: {source}")
            }
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "snapshot schema step {version} ({name}) failed: {source}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "snapshot store schema {found} is newer than this build supports ({supported})"
            ),
            Self::Sqlite(err) => write!(f, "snapshot store query failed: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
