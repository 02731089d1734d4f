//! Drag-and-drop placement.
//!
//! # Responsibility
//! - Validate drag payloads at the UI boundary.
//! - Drive one gesture at a time through an explicit state machine.

pub mod controller;
pub mod payload;
