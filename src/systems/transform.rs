use std::any::Any;

use anyhow::Result;

use crate::{
    components::{Hitbox, Position, Rotation},
    ecs::World,
    engine::{FrameContext, System},
    pool::PoolManager,
    systems::is_shown,
};

/// Rebuilds every shown entity's world-space hitbox cache from its local shapes.
pub struct TransformSystem;

impl TransformSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TransformSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for TransformSystem {
    fn name(&self) -> &'static str {
        "transform"
    }

    fn run(
        &mut self,
        _ctx: &FrameContext,
        world: &mut World,
        _pools: &mut PoolManager,
    ) -> Result<()> {
        for id in world.with::<Hitbox>() {
            if !is_shown(world, id) {
                continue;
            }
            let Some(origin) = world.get::<Position>(id).map(|p| p.as_vec()) else {
                continue;
            };
            let angle = world.get::<Rotation>(id).map_or(0.0, |r| r.angle);
            if let Some(hitbox) = world.get_mut::<Hitbox>(id) {
                let world_shapes = hitbox
                    .local
                    .iter()
                    .map(|shape| shape.to_world(origin, angle))
                    .collect();
                hitbox.world = world_shapes;
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
