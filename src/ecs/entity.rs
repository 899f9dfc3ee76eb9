//! Entity management

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque entity handle. Carries no data; liveness is tracked by the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity allocator
///
/// Ids come from a monotonic counter and are never handed out twice.
/// Recycling happens one level up, in the pool manager, which keeps the
/// same id alive instead of destroying it.
pub struct EntityAllocator {
    next_id: u64,
    alive: HashSet<EntityId>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            alive: HashSet::new(),
        }
    }

    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.alive.insert(id);
        id
    }

    /// Returns `true` if the id was alive.
    pub fn deallocate(&mut self, id: EntityId) -> bool {
        self.alive.remove(&id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.alive.contains(&id)
    }

    pub fn count(&self) -> usize {
        self.alive.len()
    }

    /// Sorted copy of the live set.
    pub fn snapshot(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.alive.iter().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
