//! Placement graph: which card sits in which cell, and how cards connect.
//!
//! # Responsibility
//! - Enforce one-card-per-cell occupancy and connection integrity.
//! - Never own card bodies; only reference them by id.

pub mod placement_graph;
