use std::any::Any;

use anyhow::Result;

use crate::{
    components::{FlightPlan, Position, Projectile, Visible},
    config::SimConfig,
    ecs::{EntityId, World},
    engine::{FrameContext, System},
    pool::PoolManager,
    systems::is_active,
};

/// Sends off-screen bullets and finished flyers back to their pools.
///
/// A flyer that finished its plan outside the screen rectangle is reclaimed
/// even while it sits in the camera margin.
pub struct CleanupSystem;

impl CleanupSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CleanupSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn outside_screen(config: &SimConfig, pos: &Position) -> bool {
    pos.x < 0.0 || pos.y < 0.0 || pos.x > config.screen.width || pos.y > config.screen.height
}

fn expired(config: &SimConfig, world: &World, id: EntityId) -> bool {
    if !is_active(world, id) {
        return false;
    }
    let hidden = world.get::<Visible>(id) == Some(&Visible(false));
    if world.has::<Projectile>(id) {
        return hidden;
    }
    let finished = world
        .get::<FlightPlan>(id)
        .map_or(false, |plan| plan.completed);
    finished
        && (hidden
            || world
                .get::<Position>(id)
                .map_or(false, |pos| outside_screen(config, pos)))
}

impl System for CleanupSystem {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn run(
        &mut self,
        ctx: &FrameContext,
        world: &mut World,
        pools: &mut PoolManager,
    ) -> Result<()> {
        let doomed: Vec<EntityId> = world
            .entities()
            .into_iter()
            .filter(|&id| expired(ctx.config, world, id))
            .collect();
        for id in doomed {
            log::trace!("cleaning up {id}");
            pools.reclaim(world, id);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
