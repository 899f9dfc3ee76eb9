use std::any::Any;

use anyhow::Result;

use crate::{
    components::{Acceleration, FlightPlan, Position, Velocity},
    ecs::{EntityId, World},
    engine::{FrameContext, System},
    pool::PoolManager,
    systems::is_shown,
};

/// Acceleration, damping, speed cap, then position integration.
pub struct MovementSystem;

impl MovementSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn damp_axis(v: f64, accel: f64, damping: f64, snap: f64, dt: f64) -> f64 {
    let v = if accel == 0.0 {
        v * (1.0 - damping * dt).max(0.0)
    } else {
        v
    };
    if v.abs() < snap {
        0.0
    } else {
        v
    }
}

fn follows_flight_plan(world: &World, id: EntityId) -> bool {
    world
        .get::<FlightPlan>(id)
        .map_or(false, |plan| !plan.completed)
}

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn run(
        &mut self,
        ctx: &FrameContext,
        world: &mut World,
        _pools: &mut PoolManager,
    ) -> Result<()> {
        let dt = ctx.dt;
        let physics = &ctx.config.physics;
        for id in world.with::<Velocity>() {
            if !is_shown(world, id) || follows_flight_plan(world, id) {
                continue;
            }
            let Some(mut vel) = world.get::<Velocity>(id).copied() else {
                continue;
            };

            if let Some(acc) = world.get::<Acceleration>(id).copied() {
                vel.dx += acc.ax * dt;
                vel.dy += acc.ay * dt;
                let (damping, snap) = (physics.damping_factor, physics.velocity_snap);
                vel.dx = damp_axis(vel.dx, acc.ax, damping, snap, dt);
                vel.dy = damp_axis(vel.dy, acc.ay, damping, snap, dt);
            }

            let speed = vel.dx.hypot(vel.dy);
            if speed > vel.max_speed && speed > 0.0 {
                let scale = vel.max_speed / speed;
                vel.dx *= scale;
                vel.dy *= scale;
            }

            world.set(id, vel);
            if let Some(pos) = world.get_mut::<Position>(id) {
                pos.x += vel.dx * dt;
                pos.y += vel.dy * dt;
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
