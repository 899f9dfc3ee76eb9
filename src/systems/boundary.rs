use std::any::Any;

use anyhow::Result;

use crate::{
    components::{FlightPlan, Position, Projectile, Sprite, Velocity},
    ecs::World,
    engine::{FrameContext, System},
    pool::PoolManager,
    systems::is_shown,
};

/// Keeps free-moving entities (the player ship) inside the screen.
/// Projectiles and scripted flyers are allowed to leave.
pub struct BoundarySystem;

impl BoundarySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BoundarySystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp `value` into `[min, max]`, reporting which side it hit.
fn clamp_axis(value: f64, min: f64, max: f64) -> (f64, i8) {
    if value < min {
        (min, -1)
    } else if value > max {
        (max, 1)
    } else {
        (value, 0)
    }
}

fn zero_outward(v: f64, side: i8) -> f64 {
    match side {
        -1 if v < 0.0 => 0.0,
        1 if v > 0.0 => 0.0,
        _ => v,
    }
}

impl System for BoundarySystem {
    fn name(&self) -> &'static str {
        "boundary"
    }

    fn run(
        &mut self,
        ctx: &FrameContext,
        world: &mut World,
        _pools: &mut PoolManager,
    ) -> Result<()> {
        let screen = &ctx.config.screen;
        for id in world.with::<Position>() {
            if !is_shown(world, id)
                || world.has::<Projectile>(id)
                || world.has::<FlightPlan>(id)
            {
                continue;
            }
            let (half_w, half_h) = world
                .get::<Sprite>(id)
                .map_or((0.0, 0.0), |s| (s.width / 2.0, s.height / 2.0));
            let Some(pos) = world.get::<Position>(id).copied() else {
                continue;
            };

            let (x, side_x) = clamp_axis(pos.x, half_w, screen.width - half_w);
            let (y, side_y) = clamp_axis(pos.y, half_h, screen.height - half_h);
            if side_x == 0 && side_y == 0 {
                continue;
            }

            world.set(id, Position::new(x, y));
            if let Some(vel) = world.get_mut::<Velocity>(id) {
                vel.dx = zero_outward(vel.dx, side_x);
                vel.dy = zero_outward(vel.dy, side_y);
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn run(world: &mut World) {
        let config = SimConfig::default();
        let ctx = FrameContext {
            frame: 1,
            dt: 1.0 / 60.0,
            elapsed: 1.0 / 60.0,
            config: &config,
        };
        BoundarySystem::new()
            .run(&ctx, world, &mut PoolManager::new())
            .unwrap();
    }

    #[test]
    fn ship_is_clamped_by_sprite_size() {
        let mut world = World::new();
        let ship = world.create_entity();
        world.set(ship, Position::new(1195.0, 10.0));
        world.set(ship, Velocity::new(40.0, 30.0));
        world.set(ship, Sprite::new("ship", 40.0, 60.0));

        run(&mut world);

        assert_eq!(world.get::<Position>(ship), Some(&Position::new(1180.0, 30.0)));
        // pushing right is cancelled, drifting down into the screen is kept
        assert_eq!(world.get::<Velocity>(ship).unwrap().dx, 0.0);
        assert_eq!(world.get::<Velocity>(ship).unwrap().dy, 30.0);
    }

    #[test]
    fn projectiles_and_flyers_pass_through() {
        let mut world = World::new();
        let bullet = world.create_entity();
        world.set(bullet, Position::new(600.0, -5.0));
        world.set(bullet, Projectile);
        let mob = world.create_entity();
        world.set(mob, Position::new(-20.0, 100.0));
        world.set(mob, FlightPlan::new(Vec::new(), 0.0));

        run(&mut world);

        assert_eq!(world.get::<Position>(bullet), Some(&Position::new(600.0, -5.0)));
        assert_eq!(world.get::<Position>(mob), Some(&Position::new(-20.0, 100.0)));
    }
}
