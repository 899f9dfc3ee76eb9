//! End-to-end frames through the default pipeline.

use space_vault::{
    components::{Damage, FlightPlan, Health, Hitbox, Position, ShapeDef, Velocity},
    config::SimConfig,
    ecs::{EntityId, World},
    engine::{Engine, EngineBuilder},
    level::{LevelLibrary, Waypoint},
    pool::{PoolCategory, PoolManager},
    scenario::ScenarioBuilder,
    systems::CollisionSystem,
};

const DT: f64 = 1.0 / 60.0;

fn engine() -> Engine {
    EngineBuilder::new(SimConfig::default())
        .with_default_passes()
        .build()
}

fn body(engine: &mut Engine, x: f64, y: f64, shape: ShapeDef) -> EntityId {
    let world = engine.world_mut();
    let id = world.create_entity();
    world.set(id, Position::new(x, y));
    world.set(id, Hitbox::new(vec![shape]));
    id
}

fn contacts(engine: &Engine) -> Vec<(EntityId, EntityId)> {
    engine
        .get_system::<CollisionSystem>()
        .map(|c| c.contacts().to_vec())
        .unwrap_or_default()
}

#[test]
fn distant_squares_never_touch() {
    let mut engine = engine();
    body(&mut engine, 0.0, 0.0, ShapeDef::rect(0.0, 0.0, 10.0, 10.0));
    body(&mut engine, 1000.0, 1000.0, ShapeDef::rect(0.0, 0.0, 10.0, 10.0));

    engine.advance(DT);

    assert!(contacts(&engine).is_empty());
}

#[test]
fn overlapping_circles_are_reported() {
    let mut engine = engine();
    let a = body(&mut engine, 0.0, 0.0, ShapeDef::circle(0.0, 0.0, 5.0));
    let b = body(&mut engine, 8.0, 0.0, ShapeDef::circle(0.0, 0.0, 5.0));

    engine.advance(DT);

    assert_eq!(contacts(&engine), vec![(a, b)]);
    assert!(engine.world().is_alive(a));
    assert!(engine.world().is_alive(b));
}

#[test]
fn lethal_hit_destroys_both_sides() {
    let mut engine = engine();
    let bullet = body(&mut engine, 300.0, 300.0, ShapeDef::circle(0.0, 0.0, 4.0));
    engine.world_mut().set(bullet, Damage(10.0));
    let target = body(&mut engine, 305.0, 300.0, ShapeDef::rect(0.0, 0.0, 20.0, 20.0));
    engine.world_mut().set(target, Health::full(10.0));

    engine.advance(DT);

    let collision = engine.get_system::<CollisionSystem>().unwrap();
    assert_eq!(collision.hits().len(), 1);
    assert_eq!(collision.hits()[0].remaining, 0.0);
    assert!(!engine.world().is_alive(bullet));
    assert!(!engine.world().is_alive(target));
    assert!(engine.world().get::<Health>(target).is_none());
}

#[test]
fn survivable_hit_leaves_target_damaged() {
    let mut engine = engine();
    let bullet = body(&mut engine, 300.0, 300.0, ShapeDef::circle(0.0, 0.0, 4.0));
    engine.world_mut().set(bullet, Damage(4.0));
    let target = body(&mut engine, 305.0, 300.0, ShapeDef::circle(0.0, 0.0, 10.0));
    engine.world_mut().set(target, Health::full(10.0));

    engine.advance(DT);

    assert!(!engine.world().is_alive(bullet));
    assert_eq!(engine.world().get::<Health>(target).unwrap().current, 6.0);
}

#[test]
fn bullet_pool_of_two() {
    let mut world = World::new();
    let mut pools = PoolManager::new();
    pools
        .register_pool(
            &mut world,
            PoolCategory::Bullet,
            2,
            |world, id| world.set(id, Velocity::zero()),
            |world, id| world.set(id, Velocity::zero()),
        )
        .unwrap();

    let first = pools.acquire(&mut world, PoolCategory::Bullet).unwrap();
    let second = pools.acquire(&mut world, PoolCategory::Bullet).unwrap();
    assert_ne!(first, second);
    assert!(pools.acquire(&mut world, PoolCategory::Bullet).is_none());

    world.set(second, Velocity::new(5.0, 5.0));
    assert!(pools.release(&mut world, PoolCategory::Bullet, second));
    let again = pools.acquire(&mut world, PoolCategory::Bullet).unwrap();
    assert_eq!(again, second);
    assert_eq!(world.get::<Velocity>(again), Some(&Velocity::zero()));
}

#[test]
fn flight_plan_converges_through_pipeline() {
    let mut engine = engine();
    let world = engine.world_mut();
    let mob = world.create_entity();
    world.set(mob, Position::new(100.0, 100.0));
    world.set(mob, Velocity::zero());
    world.set(
        mob,
        FlightPlan::new(
            vec![Waypoint::new(100.0, 100.0), Waypoint::new(100.0, 300.0)],
            0.0,
        ),
    );

    engine.run(240, DT);

    let world = engine.world();
    assert!(world.get::<FlightPlan>(mob).unwrap().completed);
    assert_eq!(world.get::<Position>(mob), Some(&Position::new(100.0, 300.0)));
}

#[test]
fn offscreen_bullet_returns_to_pool() {
    let mut engine = EngineBuilder::new(SimConfig::default())
        .with_default_passes()
        .build();
    let (world, pools) = engine.parts_mut();
    pools
        .register_pool(
            world,
            PoolCategory::Bullet,
            1,
            |world, id| world.set(id, space_vault::components::Projectile),
            |world, id| world.set(id, Position::new(-1000.0, -1000.0)),
        )
        .unwrap();
    let bullet = pools.acquire(world, PoolCategory::Bullet).unwrap();
    world.set(bullet, Position::new(600.0, 10.0));
    world.set(bullet, Velocity::new(0.0, -600.0));

    engine.run(10, DT);

    assert_eq!(engine.pools().available(PoolCategory::Bullet), 1);
    assert!(engine.world().is_alive(bullet));
}

#[test]
fn mob_without_flight_plan_frees_its_slot() {
    let library = LevelLibrary::from_yaml_str(
        r#"
level_events:
  - Level: 1
    Event_Start: 0.0
    Event: spawn_mob
    Mob_ID: 1
    Flight_Plan_ID: 404
mobs:
  - Mob_ID: 1
    Health: 20
"#,
    )
    .unwrap();
    let scenario = ScenarioBuilder::new(SimConfig::default())
        .without_player()
        .with_level(&library, 1)
        .build()
        .unwrap();
    let mut engine = scenario.engine;

    engine.run(60, DT);

    assert_eq!(engine.pools().active_count(PoolCategory::Mob), 0);
    assert_eq!(
        engine.pools().available(PoolCategory::Mob),
        engine.pools().capacity(PoolCategory::Mob)
    );
    assert!(engine.summary().contacts.is_empty());
}
