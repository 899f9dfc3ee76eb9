use std::any::Any;

use anyhow::Result;

use crate::{
    components::{Position, Visible},
    ecs::World,
    engine::{FrameContext, System},
    pool::PoolManager,
};

/// Recomputes `Visible` from position against the buffered screen rectangle.
pub struct CullingSystem;

impl CullingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CullingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CullingSystem {
    fn name(&self) -> &'static str {
        "culling"
    }

    fn run(
        &mut self,
        ctx: &FrameContext,
        world: &mut World,
        _pools: &mut PoolManager,
    ) -> Result<()> {
        let (min_x, min_y, max_x, max_y) = ctx.config.visible_bounds();
        for id in world.with::<Position>() {
            let Some(pos) = world.get::<Position>(id).copied() else {
                continue;
            };
            let on_screen = pos.x >= min_x && pos.x <= max_x && pos.y >= min_y && pos.y <= max_y;
            world.set(id, Visible(on_screen));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
