//! Canonical landmark/delve storage for one map session.
//!
//! # Responsibility
//! - Own every live card body, including monsters nested in delves.
//! - Answer id existence and kind lookups for placement checks.
//!
//! # Invariants
//! - Ids are unique across landmarks and delves.
//! - Monster ids are unique within the store.
//! - The store never reads or writes placement state.

use crate::model::entity::{Delve, Entity, EntityId, Landmark, Monster};
use crate::model::placement::CardKind;
use crate::store::collection::Collection;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from entity store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No landmark/delve (or library template) with this id.
    NotFound(EntityId),
    /// No monster with this id inside the given delve.
    MonsterNotFound {
        delve_id: EntityId,
        monster_id: EntityId,
    },
    /// An entity with this id already exists.
    DuplicateId(EntityId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "entity not found: {id}"),
            Self::MonsterNotFound {
                delve_id,
                monster_id,
            } => write!(f, "monster {monster_id} not found in delve {delve_id}"),
            Self::DuplicateId(id) => write!(f, "entity id already exists: {id}"),
        }
    }
}

impl Error for StoreError {}

/// Owner of live landmarks and delves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStore {
    landmarks: Collection<Landmark>,
    delves: Collection<Delve>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted lists.
    ///
    /// Ids colliding with an earlier entry (in either list) are dropped and
    /// returned alongside the store. Monsters repeating an earlier monster id
    /// are dropped from their delve and reported the same way.
    pub fn from_parts(landmarks: Vec<Landmark>, delves: Vec<Delve>) -> (Self, Vec<EntityId>) {
        let mut store = Self::new();
        let mut dropped = Vec::new();
        for landmark in landmarks {
            let id = landmark.id;
            if store.insert_landmark(landmark).is_err() {
                dropped.push(id);
            }
        }

        let mut seen_monsters = HashSet::new();
        for mut delve in delves {
            let id = delve.id;
            if store.contains(id) {
                dropped.push(id);
                continue;
            }
            delve.monsters.retain(|monster| {
                let first = seen_monsters.insert(monster.id);
                if !first {
                    dropped.push(monster.id);
                }
                first
            });
            if store.insert_delve(delve).is_err() {
                dropped.push(id);
            }
        }
        (store, dropped)
    }

    /// Returns the card kind of a live entity id.
    pub fn kind_of(&self, id: EntityId) -> Option<CardKind> {
        if self.landmarks.contains(id) {
            Some(CardKind::Landmark)
        } else if self.delves.contains(id) {
            Some(CardKind::Delve)
        } else {
            None
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.kind_of(id).is_some()
    }

    pub fn landmark(&self, id: EntityId) -> Option<&Landmark> {
        self.landmarks.get(id)
    }

    pub fn delve(&self, id: EntityId) -> Option<&Delve> {
        self.delves.get(id)
    }

    pub fn landmarks(&self) -> &Collection<Landmark> {
        &self.landmarks
    }

    pub fn delves(&self) -> &Collection<Delve> {
        &self.delves
    }

    pub fn insert_landmark(&mut self, landmark: Landmark) -> StoreResult<EntityId> {
        let id = landmark.id;
        if self.contains(id) {
            return Err(StoreError::DuplicateId(id));
        }
        self.landmarks
            .insert(landmark)
            .map_err(|_| StoreError::DuplicateId(id))
    }

    pub fn insert_delve(&mut self, delve: Delve) -> StoreResult<EntityId> {
        let id = delve.id;
        if self.contains(id) {
            return Err(StoreError::DuplicateId(id));
        }
        if let Some(monster_id) = repeated_monster_id(&delve) {
            return Err(StoreError::DuplicateId(monster_id));
        }
        if let Some(monster) = delve
            .monsters
            .iter()
            .find(|monster| self.monster_location(monster.id).is_some())
        {
            return Err(StoreError::DuplicateId(monster.id));
        }
        self.delves
            .insert(delve)
            .map_err(|_| StoreError::DuplicateId(id))
    }

    pub fn update_landmark(&mut self, landmark: Landmark) -> StoreResult<Landmark> {
        let id = landmark.id;
        self.landmarks
            .replace(landmark)
            .ok_or(StoreError::NotFound(id))
    }

    /// Replaces a delve body, including its monster list.
    pub fn update_delve(&mut self, delve: Delve) -> StoreResult<Delve> {
        let id = delve.id;
        if let Some(monster_id) = repeated_monster_id(&delve) {
            return Err(StoreError::DuplicateId(monster_id));
        }
        if let Some(monster) = delve.monsters.iter().find(|monster| {
            self.monster_location(monster.id)
                .is_some_and(|owner| owner != id)
        }) {
            return Err(StoreError::DuplicateId(monster.id));
        }
        self.delves.replace(delve).ok_or(StoreError::NotFound(id))
    }

    pub fn remove_landmark(&mut self, id: EntityId) -> StoreResult<Landmark> {
        self.landmarks.remove(id).ok_or(StoreError::NotFound(id))
    }

    pub fn remove_delve(&mut self, id: EntityId) -> StoreResult<Delve> {
        self.delves.remove(id).ok_or(StoreError::NotFound(id))
    }

    /// Appends a monster to a delve.
    pub fn add_monster(&mut self, delve_id: EntityId, monster: Monster) -> StoreResult<EntityId> {
        let monster_id = monster.id();
        if self.monster_location(monster_id).is_some() {
            return Err(StoreError::DuplicateId(monster_id));
        }
        let delve = self
            .delves
            .get_mut(delve_id)
            .ok_or(StoreError::NotFound(delve_id))?;
        delve.monsters.push(monster);
        Ok(monster_id)
    }

    /// Replaces one monster inside a delve, keeping its list position.
    pub fn update_monster(&mut self, delve_id: EntityId, monster: Monster) -> StoreResult<Monster> {
        let delve = self
            .delves
            .get_mut(delve_id)
            .ok_or(StoreError::NotFound(delve_id))?;
        let slot = delve
            .monsters
            .iter_mut()
            .find(|existing| existing.id == monster.id)
            .ok_or(StoreError::MonsterNotFound {
                delve_id,
                monster_id: monster.id,
            })?;
        Ok(std::mem::replace(slot, monster))
    }

    pub fn remove_monster(
        &mut self,
        delve_id: EntityId,
        monster_id: EntityId,
    ) -> StoreResult<Monster> {
        let delve = self
            .delves
            .get_mut(delve_id)
            .ok_or(StoreError::NotFound(delve_id))?;
        let index = delve
            .monsters
            .iter()
            .position(|monster| monster.id == monster_id)
            .ok_or(StoreError::MonsterNotFound {
                delve_id,
                monster_id,
            })?;
        Ok(delve.monsters.remove(index))
    }

    /// Applies a clamped progress change to a delve and returns the new value.
    pub fn mark_progress(&mut self, delve_id: EntityId, delta: i64) -> StoreResult<u32> {
        let delve = self
            .delves
            .get_mut(delve_id)
            .ok_or(StoreError::NotFound(delve_id))?;
        Ok(delve.mark_progress(delta))
    }

    /// Returns the id of the delve that owns `monster_id`.
    pub fn monster_location(&self, monster_id: EntityId) -> Option<EntityId> {
        self.delves
            .iter()
            .find(|delve| delve.monster(monster_id).is_some())
            .map(|delve| delve.id)
    }
}

/// First monster id that appears more than once in the delve's own list.
fn repeated_monster_id(delve: &Delve) -> Option<EntityId> {
    let mut seen = HashSet::with_capacity(delve.monsters.len());
    delve
        .monsters
        .iter()
        .map(|monster| monster.id)
        .find(|id| !seen.insert(*id))
}
