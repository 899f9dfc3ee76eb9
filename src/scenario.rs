use std::path::Path;

use anyhow::Result;

use crate::{
    components::{
        Acceleration, Damage, Faction, FlightPlan, Health, Hitbox, LevelManager, PlayerWeapon,
        Position, Projectile, ProjectileTemplate, Rotation, ShapeDef, Sprite, Trigger, Velocity,
        Visible,
    },
    config::SimConfig,
    ecs::{EntityId, World},
    engine::{Engine, EngineBuilder},
    hitbox::load_hitbox,
    level::{resolve_level, LevelSource},
    pool::{PoolCategory, PoolManager},
};

const PLAYER_SPRITE: (&str, f64, f64) = ("player", 64.0, 64.0);
const BULLET_SPRITE: (&str, f64, f64) = ("bullet", 4.0, 12.0);
const MOB_SPRITE: (&str, f64, f64) = ("mob", 48.0, 48.0);

fn sprite((key, width, height): (&str, f64, f64)) -> Sprite {
    Sprite::new(key, width, height)
}

/// Local hitboxes for the three kinds of body on the field.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipHitboxes {
    pub player: Vec<ShapeDef>,
    pub bullet: Vec<ShapeDef>,
    pub mob: Vec<ShapeDef>,
}

impl Default for ShipHitboxes {
    fn default() -> Self {
        Self {
            player: vec![
                ShapeDef::circle(0.0, -8.0, 14.0),
                ShapeDef::rect(0.0, 14.0, 44.0, 16.0),
            ],
            bullet: vec![ShapeDef::rect(0.0, 0.0, 4.0, 12.0)],
            mob: vec![ShapeDef::circle(0.0, 0.0, 20.0)],
        }
    }
}

impl ShipHitboxes {
    /// Read `player.json`, `bullet.json` and `mob.json` from `dir`. Unreadable
    /// files leave that body without shapes.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            player: load_hitbox(dir.join("player.json")),
            bullet: load_hitbox(dir.join("bullet.json")),
            mob: load_hitbox(dir.join("mob.json")),
        }
    }
}

/// A ready-to-run engine plus handles the host needs to drive it.
pub struct Scenario {
    pub engine: Engine,
    pub player: Option<EntityId>,
    pub level_manager: Option<EntityId>,
}

pub struct ScenarioBuilder<'a> {
    config: SimConfig,
    hitboxes: ShipHitboxes,
    level: Option<(&'a dyn LevelSource, u32)>,
    spawn_player: bool,
}

impl<'a> ScenarioBuilder<'a> {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            hitboxes: ShipHitboxes::default(),
            level: None,
            spawn_player: true,
        }
    }

    pub fn with_hitboxes(mut self, hitboxes: ShipHitboxes) -> Self {
        self.hitboxes = hitboxes;
        self
    }

    pub fn with_level(mut self, source: &'a dyn LevelSource, level: u32) -> Self {
        self.level = Some((source, level));
        self
    }

    pub fn without_player(mut self) -> Self {
        self.spawn_player = false;
        self
    }

    pub fn build(self) -> Result<Scenario> {
        self.config.validate()?;

        let mut builder = EngineBuilder::new(self.config).with_default_passes();
        let (world, pools, config) = builder.parts_mut();
        register_pools(world, pools, config, &self.hitboxes)?;

        let player = self
            .spawn_player
            .then(|| spawn_player(world, config, &self.hitboxes));

        let level_manager = self.level.map(|(source, level)| {
            let id = world.create_entity();
            world.set(id, LevelManager::new(level, resolve_level(source, level)));
            log::info!("level {level} loaded as {id}");
            id
        });

        Ok(Scenario {
            engine: builder.build(),
            player,
            level_manager,
        })
    }
}

/// Register the bullet and mob pools. Idle slots wait at the park point,
/// hidden and motionless, with their default hitbox and health restored.
pub fn register_pools(
    world: &mut World,
    pools: &mut PoolManager,
    config: &SimConfig,
    hitboxes: &ShipHitboxes,
) -> Result<()> {
    let (park_x, park_y) = config.park_point();

    let bullet_shapes = hitboxes.bullet.clone();
    let bullet_damage = config.player.bullet_damage;
    let park_bullet = move |world: &mut World, id: EntityId| {
        world.set(id, Position::new(park_x, park_y));
        world.set(id, Velocity::zero());
        world.set(id, Rotation::default());
        world.set(id, Visible(false));
        world.set(id, Hitbox::new(bullet_shapes.clone()));
        world.remove::<Faction>(id);
    };
    pools.register_pool(
        world,
        PoolCategory::Bullet,
        config.pools.bullet_capacity,
        |world, id| {
            park_bullet(world, id);
            world.set(id, sprite(BULLET_SPRITE));
            world.set(id, Damage(bullet_damage));
            world.set(id, Projectile);
        },
        park_bullet.clone(),
    )?;

    let mob_shapes = hitboxes.mob.clone();
    let mob_health = config.spawning.fallback_health;
    let park_mob = move |world: &mut World, id: EntityId| {
        world.set(id, Position::new(park_x, park_y));
        world.set(id, Velocity::zero());
        world.set(id, Rotation::default());
        world.set(id, Visible(false));
        world.set(id, Hitbox::new(mob_shapes.clone()));
        world.set(id, Health::full(mob_health));
        world.set(id, sprite(MOB_SPRITE));
        world.set(id, Faction::Hostile);
        world.remove::<FlightPlan>(id);
    };
    pools.register_pool(
        world,
        PoolCategory::Mob,
        config.pools.mob_capacity,
        &park_mob,
        park_mob.clone(),
    )?;

    Ok(())
}

/// Place the player ship at the centre of the screen.
pub fn spawn_player(world: &mut World, config: &SimConfig, hitboxes: &ShipHitboxes) -> EntityId {
    let player = &config.player;
    let id = world.create_entity();
    world.set(
        id,
        Position::new(config.screen.width / 2.0, config.screen.height / 2.0),
    );
    world.set(id, Velocity::capped(0.0, 0.0, player.max_speed));
    world.set(id, Acceleration::default());
    world.set(id, Rotation::default());
    world.set(id, sprite(PLAYER_SPRITE));
    world.set(id, Hitbox::new(hitboxes.player.clone()));
    world.set(id, Health::full(player.health));
    world.set(id, Faction::Player);
    world.set(
        id,
        PlayerWeapon {
            muzzles: vec![(-12.0, -24.0), (12.0, -24.0)],
            projectile: ProjectileTemplate {
                sprite: sprite(BULLET_SPRITE),
                hitbox: hitboxes.bullet.clone(),
            },
            speed: player.bullet_speed,
            damage: player.bullet_damage,
            fire_interval: player.fire_interval,
            cooldown: 0.0,
        },
    );
    world.set(id, Trigger::default());
    log::debug!("player spawned as {id}");
    id
}

/// Translate a stick direction (each axis in -1..=1) into player thrust.
pub fn steer_player(world: &mut World, player: EntityId, input: (f64, f64), config: &SimConfig) {
    let thrust = config.player.acceleration;
    world.set(
        player,
        Acceleration {
            ax: input.0.clamp(-1.0, 1.0) * thrust,
            ay: input.1.clamp(-1.0, 1.0) * thrust,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Active;

    #[test]
    fn pools_start_parked_and_hidden() {
        let config = SimConfig::default();
        let mut world = World::new();
        let mut pools = PoolManager::new();
        register_pools(&mut world, &mut pools, &config, &ShipHitboxes::default()).unwrap();

        assert_eq!(pools.capacity(PoolCategory::Bullet), 64);
        assert_eq!(pools.capacity(PoolCategory::Mob), 24);
        for id in world.entities() {
            assert_eq!(world.get::<Active>(id), Some(&Active(false)));
            assert_eq!(world.get::<Visible>(id), Some(&Visible(false)));
            assert_eq!(world.get::<Position>(id), Some(&Position::new(-1000.0, -1000.0)));
        }
    }

    #[test]
    fn released_mob_forgets_its_flight() {
        let config = SimConfig::default();
        let mut world = World::new();
        let mut pools = PoolManager::new();
        register_pools(&mut world, &mut pools, &config, &ShipHitboxes::default()).unwrap();

        let mob = pools.acquire(&mut world, PoolCategory::Mob).unwrap();
        world.set(mob, FlightPlan::new(Vec::new(), 0.0));
        world.get_mut::<Health>(mob).unwrap().current = 1.0;
        pools.release(&mut world, PoolCategory::Mob, mob);

        assert!(!world.has::<FlightPlan>(mob));
        assert_eq!(world.get::<Health>(mob), Some(&Health::full(10.0)));
    }

    #[test]
    fn build_without_level_has_player_only() {
        let scenario = ScenarioBuilder::new(SimConfig::default()).build().unwrap();
        let player = scenario.player.unwrap();
        let world = scenario.engine.world();
        assert_eq!(world.get::<Position>(player), Some(&Position::new(600.0, 450.0)));
        assert!(scenario.level_manager.is_none());
        assert_eq!(world.entity_count(), 64 + 24 + 1);
    }
}
