//! Card entity models: Landmark, Delve and Monster.
//!
//! # Responsibility
//! - Define the canonical card bodies owned by the entity store and library.
//! - Provide fresh-identity cloning used by every copy path.
//!
//! # Invariants
//! - `id` is stable and never reused for another entity.
//! - A `Monster` belongs to exactly one `Delve`; it is never placed on the map.
//! - Cloning through `Entity::with_fresh_id` never shares an id with the source,
//!   including nested monsters of a delve.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for landmarks, delves and monsters.
pub type EntityId = Uuid;

/// Common shape of every identity-bearing card body.
pub trait Entity: Clone {
    fn id(&self) -> EntityId;

    /// Returns a copy carrying newly minted ids (recursively for owned children).
    fn with_fresh_id(&self) -> Self;
}

/// Thematic tag attached to landmarks and delves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Cursed,
    Desolate,
    Haven,
    Occult,
    Religion,
    Technology,
    Warren,
    Wild,
}

impl Domain {
    pub const ALL: [Domain; 8] = [
        Domain::Cursed,
        Domain::Desolate,
        Domain::Haven,
        Domain::Occult,
        Domain::Religion,
        Domain::Technology,
        Domain::Warren,
        Domain::Wild,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cursed => "cursed",
            Self::Desolate => "desolate",
            Self::Haven => "haven",
            Self::Occult => "occult",
            Self::Religion => "religion",
            Self::Technology => "technology",
            Self::Warren => "warren",
            Self::Wild => "wild",
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty/harm rating expressed as a die size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressDie {
    D4,
    D6,
    D8,
    D10,
    D12,
}

impl StressDie {
    /// Number of faces on the die.
    pub fn sides(self) -> u8 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
        }
    }
}

impl Default for StressDie {
    fn default() -> Self {
        Self::D6
    }
}

impl Display for StressDie {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// Narrative location card that anchors a region of the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: EntityId,
    pub name: String,
    /// Must be non-empty for a valid landmark.
    pub domains: BTreeSet<Domain>,
    pub default_stress: StressDie,
    pub haunts: Vec<String>,
    pub bonds: Vec<String>,
}

impl Landmark {
    /// Creates a landmark with a generated id and empty haunt/bond lists.
    pub fn new(
        name: impl Into<String>,
        domains: impl IntoIterator<Item = Domain>,
        default_stress: StressDie,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            domains: domains.into_iter().collect(),
            default_stress,
            haunts: Vec::new(),
            bonds: Vec::new(),
        }
    }
}

impl Entity for Landmark {
    fn id(&self) -> EntityId {
        self.id
    }

    fn with_fresh_id(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}

/// Explorable location card with a resistance track and nested monsters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delve {
    pub id: EntityId,
    pub name: String,
    /// Valid range is `1..=50`.
    pub resistance: u32,
    /// Valid range is `0..=resistance`.
    pub progress: u32,
    pub domains: BTreeSet<Domain>,
    pub events: Vec<String>,
    pub resources: Vec<String>,
    pub monsters: Vec<Monster>,
}

impl Delve {
    /// Creates a delve with zero progress and no events, resources or monsters.
    pub fn new(
        name: impl Into<String>,
        resistance: u32,
        domains: impl IntoIterator<Item = Domain>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            resistance,
            progress: 0,
            domains: domains.into_iter().collect(),
            events: Vec::new(),
            resources: Vec::new(),
            monsters: Vec::new(),
        }
    }

    pub fn monster(&self, monster_id: EntityId) -> Option<&Monster> {
        self.monsters.iter().find(|monster| monster.id == monster_id)
    }

    /// Applies a signed progress change, clamped to `0..=resistance`.
    ///
    /// Returns the progress after the change.
    pub fn mark_progress(&mut self, delta: i64) -> u32 {
        let next = i64::from(self.progress).saturating_add(delta);
        self.progress = next.clamp(0, i64::from(self.resistance)) as u32;
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= self.resistance
    }
}

impl Entity for Delve {
    fn id(&self) -> EntityId {
        self.id
    }

    fn with_fresh_id(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            monsters: self.monsters.iter().map(Monster::with_fresh_id).collect(),
            ..self.clone()
        }
    }
}

/// Threat card owned by exactly one delve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub id: EntityId,
    pub name: String,
    /// Valid range is `1..=20`.
    pub resistance: u32,
    /// Valid range is `1..=12`.
    pub protection: u32,
    pub attacks: Vec<String>,
    pub resources: Vec<String>,
    pub notes: String,
}

impl Monster {
    pub fn new(name: impl Into<String>, resistance: u32, protection: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            resistance,
            protection,
            attacks: Vec::new(),
            resources: Vec::new(),
            notes: String::new(),
        }
    }
}

impl Entity for Monster {
    fn id(&self) -> EntityId {
        self.id
    }

    fn with_fresh_id(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}
