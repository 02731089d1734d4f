//! Map session services.
//!
//! # Responsibility
//! - Orchestrate store, graph and drag components into use-case level APIs.
//! - Keep UI layers decoupled from component wiring and persistence.

pub mod map_context;
