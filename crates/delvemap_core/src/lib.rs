//! Core domain logic for the delve map editor.
//! This crate is the single source of truth for placement and connection invariants.

pub mod config;
pub mod db;
pub mod drag;
pub mod geometry;
pub mod graph;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, GridConfig, GridOrientation, MapConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use drag::controller::{
    CancelReason, DragController, DragError, DragSource, DragState, DragTarget,
};
pub use drag::payload::DragPayload;
pub use geometry::hex::{HexGeometry, PixelPoint};
pub use graph::placement_graph::{
    PlacementError, PlacementGraph, PlacementResult, RemovedPlacement, RepairReport,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::{Delve, Domain, Entity, EntityId, Landmark, Monster, StressDie};
pub use model::placement::{CardKind, Connection, ConnectionKind, HexPosition, PlacedCard};
pub use model::snapshot::{MapId, MapSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use model::validation::Validate;
pub use repo::snapshot_repo::{
    MapSummary, RepoError, RepoResult, SnapshotRepository, SqliteSnapshotRepository,
};
pub use service::map_context::{MapContext, MapError, MapResult};
pub use store::entity_store::{EntityStore, StoreError, StoreResult};
pub use store::library::Library;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
