//! Serializable snapshot of one map session.
//!
//! # Invariants
//! - `format_version` identifies the payload shape; readers reject versions
//!   newer than `SNAPSHOT_FORMAT_VERSION`.
//! - A snapshot may carry invariant-violating data (hand edits, older
//!   writers); it is repaired when loaded into a `MapContext`.

use crate::model::entity::{Delve, Landmark};
use crate::model::placement::{Connection, PlacedCard};
use crate::store::library::Library;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a saved map.
pub type MapId = Uuid;

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Full map state: entities, placements, connections and library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub format_version: u32,
    pub map_id: MapId,
    pub name: String,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
    #[serde(default)]
    pub delves: Vec<Delve>,
    #[serde(default)]
    pub placed_cards: Vec<PlacedCard>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub library: Library,
}

impl MapSnapshot {
    /// Empty snapshot for a new map.
    pub fn empty(map_id: MapId, name: impl Into<String>) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            map_id,
            name: name.into(),
            landmarks: Vec::new(),
            delves: Vec::new(),
            placed_cards: Vec::new(),
            connections: Vec::new(),
            library: Library::default(),
        }
    }
}
