use std::any::Any;

use anyhow::Result;

use crate::{
    components::{Faction, FlightPlan, Health, Hitbox, LevelManager, Position, Sprite, Velocity},
    ecs::World,
    engine::{FrameContext, System},
    level::{EventKind, MobRecord, Waypoint},
    pool::{PoolCategory, PoolManager},
    systems::is_active,
};

/// Fires due level events, spawning pooled mobs onto their flight plans.
pub struct LevelSystem;

impl LevelSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LevelSystem {
    fn default() -> Self {
        Self::new()
    }
}

struct MobSpawn {
    level_id: u32,
    mob_id: Option<u32>,
    record: Option<MobRecord>,
    waypoints: Vec<Waypoint>,
}

fn due_spawns(manager: &mut LevelManager, dt: f64) -> Vec<MobSpawn> {
    manager.elapsed += dt;
    let mut spawns = Vec::new();
    for (index, event) in manager.events.iter().enumerate() {
        if manager.elapsed < event.event_start || !manager.fired.insert(index) {
            continue;
        }
        match event.event {
            EventKind::SpawnMob => spawns.push(MobSpawn {
                level_id: manager.level_id,
                mob_id: event.mob_id,
                record: event.mob_id.and_then(|id| manager.mobs.get(&id).cloned()),
                waypoints: event
                    .flight_plan_id
                    .and_then(|id| manager.flight_plans.get(&id).cloned())
                    .unwrap_or_default(),
            }),
        }
    }
    spawns
}

fn spawn_mob(ctx: &FrameContext, world: &mut World, pools: &mut PoolManager, spawn: MobSpawn) {
    let Some(id) = pools.acquire(world, PoolCategory::Mob) else {
        log::debug!(
            "level {}: no free mob slot for mob {:?}, spawn skipped",
            spawn.level_id,
            spawn.mob_id
        );
        return;
    };

    let (x, y) = spawn
        .waypoints
        .first()
        .map(|wp| (wp.x, wp.y))
        .unwrap_or_else(|| ctx.config.fallback_spawn());
    world.set(id, Position::new(x, y));
    world.set(id, Velocity::zero());

    let health = spawn
        .record
        .as_ref()
        .map_or(ctx.config.spawning.fallback_health, |record| record.health);
    world.set(id, Health::full(health));

    if let Some(record) = spawn.record {
        if !record.hitbox.is_empty() {
            world.set(id, Hitbox::new(record.hitbox));
        }
        if let Some(key) = record.sprite {
            match world.get_mut::<Sprite>(id) {
                Some(sprite) => sprite.atlas_key = key,
                None => world.set(id, Sprite::new(key, 0.0, 0.0)),
            }
        }
    }

    world.set(id, Faction::Hostile);
    world.set(id, FlightPlan::new(spawn.waypoints, ctx.elapsed));
    log::debug!(
        "level {}: spawned mob {:?} as {id} at ({x}, {y})",
        spawn.level_id,
        spawn.mob_id
    );
}

impl System for LevelSystem {
    fn name(&self) -> &'static str {
        "level"
    }

    fn run(
        &mut self,
        ctx: &FrameContext,
        world: &mut World,
        pools: &mut PoolManager,
    ) -> Result<()> {
        for manager_id in world.with::<LevelManager>() {
            if !is_active(world, manager_id) {
                continue;
            }
            let Some(manager) = world.get_mut::<LevelManager>(manager_id) else {
                continue;
            };
            let spawns = due_spawns(manager, ctx.dt);
            for spawn in spawns {
                spawn_mob(ctx, world, pools, spawn);
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
