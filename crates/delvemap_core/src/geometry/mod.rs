//! Grid geometry for the delve map.
//!
//! # Responsibility
//! - Own all pixel <-> cell math so placement code only sees exact cells.

pub mod hex;
