//! Ordered, id-keyed collection of card bodies.
//!
//! # Invariants
//! - Insertion order is preserved for listing.
//! - No two items share an id.

use crate::model::entity::{Entity, EntityId};
use serde::{Deserialize, Serialize};

/// Insertion-ordered set of entities keyed by their id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item` unless its id is already present.
    ///
    /// Returns the rejected item back on id collision.
    pub fn insert(&mut self, item: T) -> Result<EntityId, T> {
        let id = item.id();
        if self.contains(id) {
            return Err(item);
        }
        self.items.push(item);
        Ok(id)
    }

    /// Replaces the item with the same id, returning the previous body.
    pub fn replace(&mut self, item: T) -> Option<T> {
        let slot = self.items.iter_mut().find(|existing| existing.id() == item.id())?;
        Some(std::mem::replace(slot, item))
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Builds a collection from persisted items, dropping later duplicates.
    ///
    /// Returns the collection and the ids that were dropped.
    pub fn from_items(items: impl IntoIterator<Item = T>) -> (Self, Vec<EntityId>) {
        let mut collection = Self::new();
        let mut dropped = Vec::new();
        for item in items {
            if let Err(rejected) = collection.insert(item) {
                dropped.push(rejected.id());
            }
        }
        (collection, dropped)
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<'a, T: Entity> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Collection;
    use crate::model::entity::{Entity, Monster};

    #[test]
    fn insert_rejects_duplicate_ids_and_keeps_order() {
        let first = Monster::new("Wisp", 2, 1);
        let second = Monster::new("Shade", 3, 2);
        let mut collection = Collection::new();

        collection.insert(first.clone()).unwrap();
        collection.insert(second.clone()).unwrap();
        let rejected = collection.insert(first.clone()).unwrap_err();

        assert_eq!(rejected.id(), first.id);
        let names: Vec<&str> = collection.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Wisp", "Shade"]);
    }

    #[test]
    fn replace_and_remove_by_id() {
        let mut monster = Monster::new("Wisp", 2, 1);
        let mut collection = Collection::new();
        collection.insert(monster.clone()).unwrap();

        monster.notes = "drifts toward light".to_string();
        let previous = collection.replace(monster.clone()).unwrap();
        assert!(previous.notes.is_empty());
        assert_eq!(collection.get(monster.id).unwrap().notes, "drifts toward light");

        assert!(collection.remove(monster.id).is_some());
        assert!(collection.is_empty());
        assert!(collection.replace(monster).is_none());
    }

    #[test]
    fn from_items_drops_duplicates() {
        let monster = Monster::new("Wisp", 2, 1);
        let (collection, dropped) = Collection::from_items(vec![monster.clone(), monster.clone()]);
        assert_eq!(collection.len(), 1);
        assert_eq!(dropped, vec![monster.id]);
    }
}
