//! In-memory ownership of card bodies.
//!
//! # Responsibility
//! - `EntityStore` owns the live landmarks/delves of one map session.
//! - `Library` owns reusable templates with independent identities.
//!
//! # Invariants
//! - Card bodies have exactly one owner; placement state only holds ids.

pub mod collection;
pub mod entity_store;
pub mod library;
