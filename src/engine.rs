use std::any::Any;
use std::time::Instant;

use anyhow::Result;

use crate::{
    config::SimConfig,
    ecs::{EntityId, World},
    pool::{PoolCategory, PoolManager},
    systems::{
        BoundarySystem, CleanupSystem, CollisionSystem, CullingSystem, FlightSystem, LevelSystem,
        MovementSystem, RotationSystem, TransformSystem, WeaponSystem,
    },
};

/// Per-frame data every pass can read.
pub struct FrameContext<'a> {
    pub frame: u64,
    pub dt: f64,
    /// Simulation seconds including this frame.
    pub elapsed: f64,
    pub config: &'a SimConfig,
}

/// One pass of the frame pipeline. Passes talk to each other only through
/// the world and the pools.
pub trait System: Any {
    fn name(&self) -> &'static str;
    fn run(&mut self, ctx: &FrameContext, world: &mut World, pools: &mut PoolManager)
        -> Result<()>;
    fn as_any(&self) -> &dyn Any;
}

pub struct EngineBuilder {
    config: SimConfig,
    world: World,
    pools: PoolManager,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            world: World::new(),
            pools: PoolManager::new(),
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Register the full pipeline in the order its data dependencies need.
    pub fn with_default_passes(self) -> Self {
        self.with_system(LevelSystem::new())
            .with_system(WeaponSystem::new())
            .with_system(CullingSystem::new())
            .with_system(FlightSystem::new())
            .with_system(MovementSystem::new())
            .with_system(RotationSystem::new())
            .with_system(BoundarySystem::new())
            .with_system(TransformSystem::new())
            .with_system(CollisionSystem::new())
            .with_system(CleanupSystem::new())
    }

    pub fn parts_mut(&mut self) -> (&mut World, &mut PoolManager, &SimConfig) {
        (&mut self.world, &mut self.pools, &self.config)
    }

    pub fn build(self) -> Engine {
        Engine {
            config: self.config,
            world: self.world,
            pools: self.pools,
            systems: self.systems,
            frame: 0,
            elapsed: 0.0,
            last_reports: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PassReport {
    pub name: &'static str,
    pub duration_ms: f64,
}

#[derive(Clone, Debug)]
pub struct FrameSummary {
    pub frame: u64,
    pub elapsed: f64,
    pub entities: usize,
    pub active_bullets: usize,
    pub active_mobs: usize,
    pub contacts: Vec<(EntityId, EntityId)>,
}

pub struct Engine {
    config: SimConfig,
    world: World,
    pools: PoolManager,
    systems: Vec<Box<dyn System>>,
    frame: u64,
    elapsed: f64,
    last_reports: Vec<PassReport>,
}

impl Engine {
    /// Run every registered pass once, in registration order.
    pub fn advance(&mut self, dt: f64) {
        self.frame += 1;
        self.elapsed += dt;
        let ctx = FrameContext {
            frame: self.frame,
            dt,
            elapsed: self.elapsed,
            config: &self.config,
        };
        self.last_reports.clear();
        for system in self.systems.iter_mut() {
            let start = Instant::now();
            if let Err(err) = system.run(&ctx, &mut self.world, &mut self.pools) {
                log::warn!("frame {}: pass '{}' failed: {err:#}", ctx.frame, system.name());
            }
            let duration_ms = start.elapsed().as_secs_f64() * 1_000.0;
            log::trace!("frame {}: {} took {duration_ms:.3}ms", ctx.frame, system.name());
            self.last_reports.push(PassReport {
                name: system.name(),
                duration_ms,
            });
        }
    }

    pub fn run(&mut self, frames: u64, dt: f64) {
        for _ in 0..frames {
            self.advance(dt);
        }
    }

    pub fn run_with_hook<F>(&mut self, frames: u64, dt: f64, mut hook: F)
    where
        F: FnMut(&FrameSummary),
    {
        for _ in 0..frames {
            self.advance(dt);
            hook(&self.summary());
        }
    }

    pub fn summary(&self) -> FrameSummary {
        let contacts = self
            .get_system::<CollisionSystem>()
            .map(|collision| collision.contacts().to_vec())
            .unwrap_or_default();
        FrameSummary {
            frame: self.frame,
            elapsed: self.elapsed,
            entities: self.world.entity_count(),
            active_bullets: self.pools.active_count(PoolCategory::Bullet),
            active_mobs: self.pools.active_count(PoolCategory::Mob),
            contacts,
        }
    }

    pub fn get_system<T: 'static>(&self) -> Option<&T> {
        self.systems
            .iter()
            .find_map(|system| system.as_any().downcast_ref::<T>())
    }

    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|system| system.name()).collect()
    }

    pub fn last_reports(&self) -> &[PassReport] {
        &self.last_reports
    }

    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn pools(&self) -> &PoolManager {
        &self.pools
    }

    pub fn parts_mut(&mut self) -> (&mut World, &mut PoolManager) {
        (&mut self.world, &mut self.pools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Position;

    struct Recorder {
        label: &'static str,
        calls: u32,
    }

    impl System for Recorder {
        fn name(&self) -> &'static str {
            self.label
        }

        fn run(
            &mut self,
            ctx: &FrameContext,
            world: &mut World,
            _pools: &mut PoolManager,
        ) -> Result<()> {
            self.calls += 1;
            let id = world.create_entity();
            world.set(id, Position::new(ctx.frame as f64, ctx.elapsed));
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct Failing;

    impl System for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn run(&mut self, _: &FrameContext, _: &mut World, _: &mut PoolManager) -> Result<()> {
            anyhow::bail!("broken pass")
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn passes_run_in_registration_order() {
        let mut engine = EngineBuilder::new(SimConfig::default())
            .with_system(Recorder {
                label: "first",
                calls: 0,
            })
            .with_system(Failing)
            .with_system(Recorder {
                label: "second",
                calls: 0,
            })
            .build();

        engine.advance(0.5);
        engine.advance(0.5);

        assert_eq!(engine.current_frame(), 2);
        assert_eq!(engine.elapsed(), 1.0);
        let names: Vec<_> = engine.last_reports().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["first", "failing", "second"]);
        // a failing pass does not stop the frame
        assert_eq!(engine.world().entity_count(), 4);
        assert_eq!(engine.get_system::<Recorder>().map(|r| r.calls), Some(2));
    }

    #[test]
    fn default_pipeline_order() {
        let engine = EngineBuilder::new(SimConfig::default())
            .with_default_passes()
            .build();
        assert_eq!(
            engine.system_names(),
            vec![
                "level",
                "weapon",
                "culling",
                "flight",
                "movement",
                "rotation",
                "boundary",
                "transform",
                "collision",
                "cleanup",
            ]
        );
    }
}
