//! Object Registry
//!
//! Live objects in insertion order. An object being run is detached
//! (its slot left empty) so hooks can borrow it mutably while reading the
//! rest of the registry; it is put back in the same slot afterwards.

use glassforge_core::{EventKey, ObjectId};
use indexmap::IndexMap;

use crate::object::{GameObject, ObjectState};

/// Registry of the current level's objects
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    slots: IndexMap<ObjectId, Option<GameObject>>,
    next_id: u32,
}

impl ObjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id
    pub fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    /// The id the next allocation will return
    pub fn next_id(&self) -> ObjectId {
        ObjectId(self.next_id)
    }

    /// Add an object at the end of the registry order
    pub fn insert(&mut self, object: GameObject) {
        self.slots.insert(object.id(), Some(object));
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.slots.get(&id).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.slots.get_mut(&id).and_then(Option::as_mut)
    }

    /// State of an attached object
    pub fn state(&self, id: ObjectId) -> Option<&ObjectState> {
        self.get(id).map(|object| &object.state)
    }

    /// Check if an object is registered, attached or not
    pub fn contains(&self, id: ObjectId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Take an object out of its slot
    pub fn detach(&mut self, id: ObjectId) -> Option<GameObject> {
        self.slots.get_mut(&id).and_then(Option::take)
    }

    /// Return a detached object to its slot
    pub fn reattach(&mut self, object: GameObject) {
        match self.slots.get_mut(&object.id()) {
            Some(slot) => *slot = Some(object),
            None => log::warn!("reattach: object {} is no longer registered", object.id()),
        }
    }

    /// Remove an object, keeping the order of the others
    pub fn remove(&mut self, id: ObjectId) -> Option<GameObject> {
        self.slots.shift_remove(&id).flatten()
    }

    /// Snapshot of the registered ids in order
    pub fn ids(&self) -> Vec<ObjectId> {
        self.slots.keys().copied().collect()
    }

    /// Attached objects in registry order
    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.slots.values().filter_map(Option::as_ref)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GameObject> {
        self.slots.values_mut().filter_map(Option::as_mut)
    }

    /// Ids of the objects subscribed to an event, in registry order
    pub fn subscribers(&self, key: &EventKey) -> Vec<ObjectId> {
        self.iter()
            .filter(|object| object.state.is_subscribed(key))
            .map(GameObject::id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Remove every object and restart ids from zero
    pub fn drain(&mut self) -> Vec<GameObject> {
        self.next_id = 0;
        self.slots.drain(..).filter_map(|(_, object)| object).collect()
    }
}
