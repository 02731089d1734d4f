//! Personal library of reusable card templates.
//!
//! # Responsibility
//! - Keep landmark/delve/monster templates independent of any live map entity.
//! - Hand out freshly-identified copies so templates never alias live cards.
//!
//! # Invariants
//! - A copy never carries the id of its template (nested monsters included).
//! - Saving a live entity into the library mints a new template id.

use crate::model::entity::{Delve, Entity, EntityId, Landmark, Monster};
use crate::store::collection::Collection;
use crate::store::entity_store::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// Template collections, serialized as part of every map snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Library {
    pub landmarks: Collection<Landmark>,
    pub delves: Collection<Delve>,
    pub monsters: Collection<Monster>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_landmark(&mut self, template: Landmark) -> StoreResult<EntityId> {
        let id = template.id;
        self.landmarks
            .insert(template)
            .map_err(|_| StoreError::DuplicateId(id))
    }

    pub fn add_delve(&mut self, template: Delve) -> StoreResult<EntityId> {
        let id = template.id;
        self.delves
            .insert(template)
            .map_err(|_| StoreError::DuplicateId(id))
    }

    pub fn add_monster(&mut self, template: Monster) -> StoreResult<EntityId> {
        let id = template.id;
        self.monsters
            .insert(template)
            .map_err(|_| StoreError::DuplicateId(id))
    }

    pub fn update_landmark(&mut self, template: Landmark) -> StoreResult<Landmark> {
        let id = template.id;
        self.landmarks
            .replace(template)
            .ok_or(StoreError::NotFound(id))
    }

    pub fn update_delve(&mut self, template: Delve) -> StoreResult<Delve> {
        let id = template.id;
        self.delves.replace(template).ok_or(StoreError::NotFound(id))
    }

    pub fn update_monster(&mut self, template: Monster) -> StoreResult<Monster> {
        let id = template.id;
        self.monsters
            .replace(template)
            .ok_or(StoreError::NotFound(id))
    }

    pub fn remove_landmark(&mut self, id: EntityId) -> StoreResult<Landmark> {
        self.landmarks.remove(id).ok_or(StoreError::NotFound(id))
    }

    pub fn remove_delve(&mut self, id: EntityId) -> StoreResult<Delve> {
        self.delves.remove(id).ok_or(StoreError::NotFound(id))
    }

    pub fn remove_monster(&mut self, id: EntityId) -> StoreResult<Monster> {
        self.monsters.remove(id).ok_or(StoreError::NotFound(id))
    }

    /// Returns a freshly-identified copy of a landmark template.
    pub fn copy_landmark(&self, template_id: EntityId) -> StoreResult<Landmark> {
        copy_from(&self.landmarks, template_id)
    }

    /// Returns a freshly-identified copy of a delve template and its monsters.
    pub fn copy_delve(&self, template_id: EntityId) -> StoreResult<Delve> {
        copy_from(&self.delves, template_id)
    }

    pub fn copy_monster(&self, template_id: EntityId) -> StoreResult<Monster> {
        copy_from(&self.monsters, template_id)
    }

    /// Stores a copy of a live landmark as a new template.
    pub fn save_landmark(&mut self, live: &Landmark) -> StoreResult<EntityId> {
        self.add_landmark(live.with_fresh_id())
    }

    /// Stores a copy of a live delve (with its monsters) as a new template.
    pub fn save_delve(&mut self, live: &Delve) -> StoreResult<EntityId> {
        self.add_delve(live.with_fresh_id())
    }

    pub fn save_monster(&mut self, live: &Monster) -> StoreResult<EntityId> {
        self.add_monster(live.with_fresh_id())
    }

    /// Rebuilds each collection dropping later duplicate ids.
    ///
    /// Returns the cleaned library and the dropped template ids.
    pub fn deduplicated(self) -> (Self, Vec<EntityId>) {
        let (landmarks, mut dropped) = Collection::from_items(self.landmarks.into_vec());
        let (delves, dropped_delves) = Collection::from_items(self.delves.into_vec());
        let (monsters, dropped_monsters) = Collection::from_items(self.monsters.into_vec());
        dropped.extend(dropped_delves);
        dropped.extend(dropped_monsters);
        (
            Self {
                landmarks,
                delves,
                monsters,
            },
            dropped,
        )
    }
}

fn copy_from<T: Entity>(collection: &Collection<T>, template_id: EntityId) -> StoreResult<T> {
    collection
        .get(template_id)
        .map(Entity::with_fresh_id)
        .ok_or(StoreError::NotFound(template_id))
}

#[cfg(test)]
mod tests {
    use super::Library;
    use crate::model::entity::{Delve, Domain, Landmark, Monster, StressDie};
    use crate::store::entity_store::StoreError;

    #[test]
    fn copies_never_reuse_template_ids() {
        let mut library = Library::new();
        let template = Landmark::new("Watchtower", [Domain::Haven], StressDie::D6);
        library.add_landmark(template.clone()).unwrap();

        let first = library.copy_landmark(template.id).unwrap();
        let second = library.copy_landmark(template.id).unwrap();
        assert_ne!(first.id, template.id);
        assert_ne!(first.id, second.id);
        assert_eq!(first.name, second.name);
    }

    #[test]
    fn saving_live_delve_mints_template_ids() {
        let mut library = Library::new();
        let mut live = Delve::new("Catacombs", 12, [Domain::Cursed]);
        live.monsters.push(Monster::new("Ghoul", 6, 3));

        let template_id = library.save_delve(&live).unwrap();
        let template = library.delves.get(template_id).unwrap();
        assert_ne!(template_id, live.id);
        assert_ne!(template.monsters[0].id, live.monsters[0].id);
    }

    #[test]
    fn copy_of_missing_template_is_not_found() {
        let library = Library::new();
        let id = uuid::Uuid::new_v4();
        assert_eq!(library.copy_monster(id), Err(StoreError::NotFound(id)));
    }
}
