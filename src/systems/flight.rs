use std::any::Any;

use anyhow::Result;

use crate::{
    components::{FlightPlan, Position, Velocity},
    ecs::{EntityId, World},
    engine::{FrameContext, System},
    level::WaypointAction,
    pool::PoolManager,
    systems::is_active,
};

/// Steers entities along their waypoint lists. Runs off-screen too, so mobs
/// entering from outside the camera still make progress.
pub struct FlightSystem;

impl FlightSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FlightSystem {
    fn default() -> Self {
        Self::new()
    }
}

enum Step {
    Waiting,
    EnRoute,
    Arrived(WaypointAction),
}

fn steer(ctx: &FrameContext, world: &mut World, id: EntityId) -> Option<Step> {
    let plan = world.get::<FlightPlan>(id)?;
    let waypoint = plan.current()?.clone();
    if ctx.elapsed - plan.start_time < waypoint.time_offset {
        world.set(id, Velocity::zero());
        return Some(Step::Waiting);
    }

    let pos = world.get::<Position>(id).copied()?;
    let (dx, dy) = (waypoint.x - pos.x, waypoint.y - pos.y);
    let distance = dx.hypot(dy);
    let travel = waypoint.speed * ctx.dt;

    if distance < ctx.config.physics.arrival_epsilon || travel >= distance {
        world.set(id, Position::new(waypoint.x, waypoint.y));
        return Some(Step::Arrived(waypoint.action));
    }

    let (ux, uy) = (dx / distance, dy / distance);
    world.set(id, Position::new(pos.x + ux * travel, pos.y + uy * travel));
    world.set(id, Velocity::new(ux * waypoint.speed, uy * waypoint.speed));
    Some(Step::EnRoute)
}

impl System for FlightSystem {
    fn name(&self) -> &'static str {
        "flight"
    }

    fn run(
        &mut self,
        ctx: &FrameContext,
        world: &mut World,
        pools: &mut PoolManager,
    ) -> Result<()> {
        for id in world.with::<FlightPlan>() {
            if !is_active(world, id) {
                continue;
            }
            let Some(Step::Arrived(action)) = steer(ctx, world, id) else {
                continue;
            };

            if action == WaypointAction::Exit {
                log::trace!("{id} left through an exit waypoint");
                pools.reclaim(world, id);
                continue;
            }

            let mut finished = false;
            if let Some(plan) = world.get_mut::<FlightPlan>(id) {
                plan.current_step += 1;
                if plan.current_step >= plan.waypoints.len() {
                    plan.completed = true;
                    finished = true;
                }
            }
            if finished {
                world.set(id, Velocity::zero());
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
    use crate::components::Visible;
    use crate::config::SimConfig;
    use crate::level::Waypoint;

    fn step(world: &mut World, pools: &mut PoolManager, frame: u64, dt: f64) {
        let config = SimConfig::default();
        let ctx = FrameContext {
            frame,
            dt,
            elapsed: frame as f64 * dt,
            config: &config,
        };
        FlightSystem::new().run(&ctx, world, pools).unwrap();
    }

    fn flyer(world: &mut World, x: f64, y: f64, waypoints: Vec<Waypoint>) -> EntityId {
        let id = world.create_entity();
        world.set(id, Position::new(x, y));
        world.set(id, Velocity::zero());
        world.set(id, FlightPlan::new(waypoints, 0.0));
        id
    }

    #[test]
    fn converges_on_last_waypoint() {
        let mut world = World::new();
        let mut pools = PoolManager::new();
        let id = flyer(
            &mut world,
            100.0,
            100.0,
            vec![Waypoint::new(100.0, 100.0), Waypoint::new(100.0, 300.0)],
        );

        for frame in 1..=240 {
            step(&mut world, &mut pools, frame, 1.0 / 60.0);
        }

        let plan = world.get::<FlightPlan>(id).unwrap();
        assert!(plan.completed);
        assert_eq!(world.get::<Position>(id), Some(&Position::new(100.0, 300.0)));
        assert_eq!(world.get::<Velocity>(id), Some(&Velocity::zero()));
    }

    #[test]
    fn waits_for_time_offset() {
        let mut world = World::new();
        let mut pools = PoolManager::new();
        let id = flyer(
            &mut world,
            0.0,
            0.0,
            vec![Waypoint::new(0.0, 100.0).with_offset(1.0)],
        );

        step(&mut world, &mut pools, 1, 0.5);
        assert_eq!(world.get::<Position>(id), Some(&Position::new(0.0, 0.0)));

        step(&mut world, &mut pools, 2, 0.5);
        let pos = world.get::<Position>(id).unwrap();
        assert!((pos.y - 50.0).abs() < 1e-9);
        assert!((world.get::<Velocity>(id).unwrap().dy - 100.0).abs() < 1e-9);
    }

    #[test]
    fn exit_waypoint_reclaims() {
        let mut world = World::new();
        let mut pools = PoolManager::new();
        let id = flyer(
            &mut world,
            0.0,
            0.0,
            vec![Waypoint::new(0.0, 0.5).with_action(WaypointAction::Exit)],
        );

        step(&mut world, &mut pools, 1, 1.0 / 60.0);

        assert!(!world.is_alive(id));
    }

    #[test]
    fn runs_while_off_screen() {
        let mut world = World::new();
        let mut pools = PoolManager::new();
        let id = flyer(
            &mut world,
            0.0,
            -200.0,
            vec![Waypoint::new(0.0, 0.0).with_speed(60.0)],
        );
        world.set(id, Visible(false));

        step(&mut world, &mut pools, 1, 1.0);

        assert!((world.get::<Position>(id).unwrap().y + 140.0).abs() < 1e-9);
    }

    #[test]
    fn fire_waypoint_is_plain_arrival() {
        let mut world = World::new();
        let mut pools = PoolManager::new();
        let id = flyer(
            &mut world,
            0.0,
            0.0,
            vec![
                Waypoint::new(0.0, 0.5).with_action(WaypointAction::Fire),
                Waypoint::new(0.0, 100.0),
            ],
        );

        step(&mut world, &mut pools, 1, 1.0 / 60.0);

        assert!(world.is_alive(id));
        let plan = world.get::<FlightPlan>(id).unwrap();
        assert_eq!(plan.current_step, 1);
        assert!(!plan.completed);
        assert_eq!(world.get::<Position>(id), Some(&Position::new(0.0, 0.5)));
    }
}
