//! Card content validation.
//!
//! # Responsibility
//! - Report human-readable problems with a (possibly partial) card body.
//!
//! # Invariants
//! - Messages are returned in field order; an empty list means valid.
//! - Validation never mutates the card and never touches placement state.

use crate::model::entity::{Delve, Landmark, Monster};
use std::ops::RangeInclusive;

pub const DELVE_RESISTANCE_RANGE: RangeInclusive<u32> = 1..=50;
pub const MONSTER_RESISTANCE_RANGE: RangeInclusive<u32> = 1..=20;
pub const MONSTER_PROTECTION_RANGE: RangeInclusive<u32> = 1..=12;

/// Content validator contract shared by all card bodies.
pub trait Validate {
    /// Returns ordered error messages; empty when the card is valid.
    fn validation_errors(&self) -> Vec<String>;

    fn is_valid(&self) -> bool {
        self.validation_errors().is_empty()
    }
}

impl Validate for Landmark {
    fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_name(&self.name, &mut errors);
        if self.domains.is_empty() {
            errors.push("at least one domain is required".to_string());
        }
        check_entries("haunt", &self.haunts, &mut errors);
        check_entries("bond", &self.bonds, &mut errors);
        errors
    }
}

impl Validate for Delve {
    fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_name(&self.name, &mut errors);
        check_range("resistance", self.resistance, &DELVE_RESISTANCE_RANGE, &mut errors);
        if self.progress > self.resistance {
            errors.push(format!(
                "progress ({}) cannot exceed resistance ({})",
                self.progress, self.resistance
            ));
        }
        if self.domains.is_empty() {
            errors.push("at least one domain is required".to_string());
        }
        check_entries("event", &self.events, &mut errors);
        check_entries("resource", &self.resources, &mut errors);
        for (index, monster) in self.monsters.iter().enumerate() {
            let label = monster_label(index, monster);
            errors.extend(
                monster
                    .validation_errors()
                    .into_iter()
                    .map(|message| format!("{label}: {message}")),
            );
        }
        errors
    }
}

impl Validate for Monster {
    fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_name(&self.name, &mut errors);
        check_range(
            "resistance",
            self.resistance,
            &MONSTER_RESISTANCE_RANGE,
            &mut errors,
        );
        check_range(
            "protection",
            self.protection,
            &MONSTER_PROTECTION_RANGE,
            &mut errors,
        );
        check_entries("attack", &self.attacks, &mut errors);
        check_entries("resource", &self.resources, &mut errors);
        errors
    }
}

fn monster_label(index: usize, monster: &Monster) -> String {
    let name = monster.name.trim();
    if name.is_empty() {
        format!("monster {}", index + 1)
    } else {
        format!("monster {} `{name}`", index + 1)
    }
}

fn check_name(name: &str, errors: &mut Vec<String>) {
    if name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
}

fn check_range(field: &str, value: u32, range: &RangeInclusive<u32>, errors: &mut Vec<String>) {
    if !range.contains(&value) {
        errors.push(format!(
            "{field} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        ));
    }
}

fn check_entries(field: &str, entries: &[String], errors: &mut Vec<String>) {
    for (index, entry) in entries.iter().enumerate() {
        if entry.trim().is_empty() {
            errors.push(format!("{field} {} cannot be blank", index + 1));
        }
    }
}
