//! Domain model for delve map cards and their placement.
//!
//! # Responsibility
//! - Define card bodies (landmark/delve/monster) and placement records.
//! - Define the content validator used before cards are committed.
//!
//! # Invariants
//! - Every card is identified by a stable `EntityId`.
//! - Placement records reference cards by id only; they never own card bodies.

pub mod entity;
pub mod placement;
pub mod snapshot;
pub mod validation;
