//! Fixed-capacity entity pools
//!
//! Pooled entities are created once at registration and never leave the
//! store. Checking one out flips it to `Active(true)`; returning it flips it
//! back and re-runs the category's reset hook.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::Active;
use crate::ecs::{EntityId, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolCategory {
    Bullet,
    Mob,
}

impl fmt::Display for PoolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolCategory::Bullet => write!(f, "bullet"),
            PoolCategory::Mob => write!(f, "mob"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("pool '{0}' is already registered")]
    AlreadyRegistered(PoolCategory),
}

pub type PoolHook = Box<dyn Fn(&mut World, EntityId)>;

struct Pool {
    capacity: usize,
    free: Vec<EntityId>,
    idle: HashSet<EntityId>,
    reset: PoolHook,
}

#[derive(Default)]
pub struct PoolManager {
    pools: HashMap<PoolCategory, Pool>,
    owners: HashMap<EntityId, PoolCategory>,
}

impl PoolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `capacity` idle entities for `category`. `init` runs once per
    /// slot; `reset` runs on every acquire and release.
    pub fn register_pool<I, R>(
        &mut self,
        world: &mut World,
        category: PoolCategory,
        capacity: usize,
        init: I,
        reset: R,
    ) -> Result<(), PoolError>
    where
        I: Fn(&mut World, EntityId),
        R: Fn(&mut World, EntityId) + 'static,
    {
        if self.pools.contains_key(&category) {
            return Err(PoolError::AlreadyRegistered(category));
        }

        let mut free = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            let id = world.create_entity();
            init(world, id);
            world.set(id, Active(false));
            self.owners.insert(id, category);
            free.push(id);
        }
        let idle = free.iter().copied().collect();
        log::debug!("registered pool '{category}' with {capacity} slots");
        self.pools.insert(
            category,
            Pool {
                capacity,
                free,
                idle,
                reset: Box::new(reset),
            },
        );
        Ok(())
    }

    /// Check an entity out, or `None` when the pool is empty or unknown.
    pub fn acquire(&mut self, world: &mut World, category: PoolCategory) -> Option<EntityId> {
        let Some(pool) = self.pools.get_mut(&category) else {
            log::debug!("acquire from unregistered pool '{category}'");
            return None;
        };
        while let Some(id) = pool.free.pop() {
            pool.idle.remove(&id);
            if !world.is_alive(id) {
                // destroyed behind the pool's back; the slot is gone for good
                self.owners.remove(&id);
                continue;
            }
            world.set(id, Active(true));
            (pool.reset)(world, id);
            return Some(id);
        }
        log::debug!("pool '{category}' exhausted");
        None
    }

    /// Return a checked-out entity. Returns `false` (and does nothing) for
    /// dead ids, ids from another pool and ids that are already idle.
    pub fn release(&mut self, world: &mut World, category: PoolCategory, id: EntityId) -> bool {
        if self.owners.get(&id) != Some(&category) || !world.is_alive(id) {
            return false;
        }
        let Some(pool) = self.pools.get_mut(&category) else {
            return false;
        };
        if !pool.idle.insert(id) {
            return false;
        }
        world.set(id, Active(false));
        (pool.reset)(world, id);
        pool.free.push(id);
        true
    }

    /// Take an entity out of play: back to its pool if pooled, destroyed otherwise.
    pub fn reclaim(&mut self, world: &mut World, id: EntityId) {
        match self.category_of(id) {
            Some(category) => {
                self.release(world, category, id);
            }
            None => world.destroy_entity(id),
        }
    }

    pub fn category_of(&self, id: EntityId) -> Option<PoolCategory> {
        self.owners.get(&id).copied()
    }

    pub fn is_pooled(&self, id: EntityId) -> bool {
        self.owners.contains_key(&id)
    }

    pub fn available(&self, category: PoolCategory) -> usize {
        self.pools.get(&category).map(|p| p.free.len()).unwrap_or(0)
    }

    pub fn capacity(&self, category: PoolCategory) -> usize {
        self.pools.get(&category).map(|p| p.capacity).unwrap_or(0)
    }

    pub fn active_count(&self, category: PoolCategory) -> usize {
        self.pools
            .get(&category)
            .map(|p| {
                self.owners
                    .iter()
                    .filter(|(id, owner)| **owner == category && !p.idle.contains(*id))
                    .count()
            })
            .unwrap_or(0)
    }
}
