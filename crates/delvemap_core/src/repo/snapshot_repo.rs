//! Map snapshot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Save and load whole-map snapshots keyed by map id.
//! - Keep SQL and payload encoding inside the persistence boundary.
//!
//! # Invariants
//! - Saves are upserts: one row per map id.
//! - Reads reject rows whose payload cannot be decoded, whose embedded id
//!   disagrees with the row key, or whose format is newer than supported.
//! - The repository never repairs graph data; `MapContext::from_snapshot` does.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::snapshot::{MapId, MapSnapshot, SNAPSHOT_FORMAT_VERSION};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from snapshot persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Payload could not be encoded/decoded as JSON.
    Serialization(serde_json::Error),
    /// Snapshot format is not readable by this build.
    UnsupportedFormat { found: u32, supported: u32 },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    NotFound(MapId),
    /// Persisted data cannot be converted to a valid snapshot.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "snapshot payload error: {err}"),
            Self::UnsupportedFormat { found, supported } => write!(
                f,
                "snapshot format version {found} is not supported (latest {supported})"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "snapshot repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::NotFound(id) => write!(f, "map not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted map data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::UnsupportedFormat { .. } => None,
            Self::UninitializedConnection { .. } => None,
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Listing row for saved maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSummary {
    pub map_id: MapId,
    pub name: String,
    pub card_count: u32,
    pub connection_count: u32,
    /// Epoch ms of the last save.
    pub updated_at: i64,
}

/// Persistence collaborator for whole-map snapshots.
pub trait SnapshotRepository {
    /// Inserts or replaces the snapshot stored under `snapshot.map_id`.
    fn save_snapshot(&self, snapshot: &MapSnapshot) -> RepoResult<()>;
    fn load_snapshot(&self, map_id: MapId) -> RepoResult<Option<MapSnapshot>>;
    /// Saved maps, most recently saved first.
    fn list_maps(&self) -> RepoResult<Vec<MapSummary>>;
    fn delete_snapshot(&self, map_id: MapId) -> RepoResult<()>;
}

/// SQLite-backed snapshot repository storing JSON payloads.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn save_snapshot(&self, snapshot: &MapSnapshot) -> RepoResult<()> {
        ensure_supported_format(snapshot.format_version)?;
        let payload = serde_json::to_string(snapshot)?;

        self.conn.execute(
            "INSERT INTO map_snapshots (
                map_id,
                name,
                format_version,
                payload,
                card_count,
                connection_count
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(map_id) DO UPDATE SET
                name = excluded.name,
                format_version = excluded.format_version,
                payload = excluded.payload,
                card_count = excluded.card_count,
                connection_count = excluded.connection_count,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                snapshot.map_id.to_string(),
                snapshot.name.as_str(),
                snapshot.format_version,
                payload,
                count_to_db(snapshot.placed_cards.len()),
                count_to_db(snapshot.connections.len()),
            ],
        )?;

        Ok(())
    }

    fn load_snapshot(&self, map_id: MapId) -> RepoResult<Option<MapSnapshot>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM map_snapshots WHERE map_id = ?1;",
                [map_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        let snapshot = parse_payload(&payload)?;
        if snapshot.map_id != map_id {
            return Err(RepoError::InvalidData(format!(
                "payload map_id `{}` does not match row key `{map_id}`",
                snapshot.map_id
            )));
        }
        Ok(Some(snapshot))
    }

    fn list_maps(&self) -> RepoResult<Vec<MapSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT map_id, name, card_count, connection_count, updated_at
             FROM map_snapshots
             ORDER BY updated_at DESC, map_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(parse_summary_row(row)?);
        }
        Ok(summaries)
    }

    fn delete_snapshot(&self, map_id: MapId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM map_snapshots WHERE map_id = ?1;",
            [map_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(map_id));
        }
        Ok(())
    }
}

fn parse_payload(payload: &str) -> RepoResult<MapSnapshot> {
    // Read the version first so newer formats fail with a precise error
    // instead of a field-level decode error.
    let value: serde_json::Value = serde_json::from_str(payload)?;
    let found = value
        .get("format_version")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| RepoError::InvalidData("payload has no format_version".to_string()))?;
    let found = u32::try_from(found)
        .map_err(|_| RepoError::InvalidData(format!("format_version `{found}` out of range")))?;
    ensure_supported_format(found)?;
    Ok(serde_json::from_value(value)?)
}

fn parse_summary_row(row: &Row<'_>) -> RepoResult<MapSummary> {
    let id_text: String = row.get("map_id")?;
    let map_id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in map_snapshots.map_id"))
    })?;
    Ok(MapSummary {
        map_id,
        name: row.get("name")?,
        card_count: row.get("card_count")?,
        connection_count: row.get("connection_count")?,
        updated_at: row.get("updated_at")?,
    })
}

fn ensure_supported_format(found: u32) -> RepoResult<()> {
    if found == 0 || found > SNAPSHOT_FORMAT_VERSION {
        return Err(RepoError::UnsupportedFormat {
            found,
            supported: SNAPSHOT_FORMAT_VERSION,
        });
    }
    Ok(())
}

fn count_to_db(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}
