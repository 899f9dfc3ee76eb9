//! World - central ECS container

use std::any::TypeId;
use std::collections::HashMap;

use super::entity::EntityAllocator;
use super::{Component, ComponentStorage, EntityId, TypedComponentStorage};

/// World holds all entities and their component tables.
///
/// Every lookup against a dead id answers "absent"; writes against a dead id
/// are dropped.
pub struct World {
    entities: EntityAllocator,
    components: HashMap<TypeId, Box<dyn ComponentStorage>>,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            components: HashMap::new(),
        }
    }

    /// Create a new entity
    pub fn create_entity(&mut self) -> EntityId {
        self.entities.allocate()
    }

    /// Destroy an entity and remove all its components
    pub fn destroy_entity(&mut self, entity: EntityId) {
        if !self.entities.deallocate(entity) {
            return;
        }
        for storage in self.components.values_mut() {
            storage.remove(entity);
        }
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.count()
    }

    /// Sorted copy of every live id. Safe to iterate while destroying.
    pub fn entities(&self) -> Vec<EntityId> {
        self.entities.snapshot()
    }

    /// Attach `component`, replacing any value of the same type.
    pub fn set<T: Component>(&mut self, entity: EntityId, component: T) {
        if !self.entities.is_alive(entity) {
            return;
        }
        let storage = self
            .components
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(TypedComponentStorage::<T>::new()));
        if let Some(storage) = storage
            .as_any_mut()
            .downcast_mut::<TypedComponentStorage<T>>()
        {
            storage.insert(entity, component);
        }
    }

    /// Detach and return a component.
    pub fn remove<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        self.get_storage_mut::<T>()?.take(entity)
    }

    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.get_storage::<T>()?.get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.get_storage_mut::<T>()?.get_mut(entity)
    }

    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        self.get_storage::<T>()
            .map(|storage| storage.has(entity))
            .unwrap_or(false)
    }

    /// Sorted snapshot of the ids carrying `T`.
    pub fn with<T: Component>(&self) -> Vec<EntityId> {
        self.get_storage::<T>()
            .map(|storage| storage.ids())
            .unwrap_or_default()
    }

    pub fn get_storage<T: Component>(&self) -> Option<&TypedComponentStorage<T>> {
        self.components
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<TypedComponentStorage<T>>()
    }

    pub fn get_storage_mut<T: Component>(&mut self) -> Option<&mut TypedComponentStorage<T>> {
        self.components
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<TypedComponentStorage<T>>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
