use std::any::Any;

use anyhow::Result;

use crate::{
    components::Rotation,
    ecs::World,
    engine::{FrameContext, System},
    pool::PoolManager,
    systems::is_shown,
};

pub struct RotationSystem;

/// Wrap into `[0, 360)`. `rem_euclid` rounds tiny negative inputs up to 360.
fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

impl RotationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RotationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RotationSystem {
    fn name(&self) -> &'static str {
        "rotation"
    }

    fn run(
        &mut self,
        ctx: &FrameContext,
        world: &mut World,
        _pools: &mut PoolManager,
    ) -> Result<()> {
        for id in world.with::<Rotation>() {
            if !is_shown(world, id) {
                continue;
            }
            if let Some(rotation) = world.get_mut::<Rotation>(id) {
                rotation.angle = wrap_degrees(rotation.angle + rotation.angular_speed * ctx.dt);
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

    fn step(world: &mut World, dt: f64) {
        let config = SimConfig::default();
        let ctx = FrameContext {
            frame: 1,
            dt,
            elapsed: dt,
            config: &config,
        };
        RotationSystem::new()
            .run(&ctx, world, &mut PoolManager::new())
            .unwrap();
    }

    #[test]
    fn angle_wraps_both_directions() {
        let mut world = World::new();
        let cw = world.create_entity();
        world.set(
            cw,
            Rotation {
                angle: 350.0,
                angular_speed: 30.0,
            },
        );
        let ccw = world.create_entity();
        world.set(
            ccw,
            Rotation {
                angle: 10.0,
                angular_speed: -30.0,
            },
        );

        step(&mut world, 1.0);

        assert!((world.get::<Rotation>(cw).unwrap().angle - 20.0).abs() < 1e-9);
        assert!((world.get::<Rotation>(ccw).unwrap().angle - 340.0).abs() < 1e-9);
    }

    #[test]
    fn tiny_negative_step_stays_below_full_turn() {
        let mut world = World::new();
        let id = world.create_entity();
        world.set(
            id,
            Rotation {
                angle: 0.0,
                angular_speed: -1e-15,
            },
        );

        step(&mut world, 1.0);

        let angle = world.get::<Rotation>(id).unwrap().angle;
        assert!((0.0..360.0).contains(&angle), "angle = {angle}");
    }
}
