//! Persistence boundary for saved maps.
//!
//! # Responsibility
//! - Define the snapshot save/load contract used by hosts.
//! - Isolate SQLite and payload encoding from map orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `UnsupportedFormat`)
//!   in addition to DB transport errors.

pub mod snapshot_repo;
