use space_vault::{
    components::{Health, Position, Trigger},
    config::SimConfig,
    level::{LevelLoader, LevelSource},
    pool::PoolCategory,
    scenario::{steer_player, ScenarioBuilder, ShipHitboxes},
};

#[test]
fn engine_runs_hook_each_frame() {
    let library = LevelLoader::new(".")
        .load("levels/campaign.yaml")
        .expect("level library should load");
    let scenario = ScenarioBuilder::new(SimConfig::default())
        .with_level(&library, 1)
        .build()
        .expect("scenario builds");
    let mut engine = scenario.engine;

    let mut frames = Vec::new();
    let mut peak_mobs = 0;
    engine.run_with_hook(6, 1.0 / 60.0, |summary| {
        frames.push(summary.frame);
        peak_mobs = peak_mobs.max(summary.active_mobs);
    });

    assert_eq!(frames, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(peak_mobs, 0);
    assert_eq!(engine.last_reports().len(), 10);
}

#[test]
fn campaign_level_spawns_mobs_on_schedule() {
    let library = LevelLoader::new(".")
        .load("levels/campaign.yaml")
        .expect("level library should load");
    assert!(!library.events_for_level(1).is_empty());

    let scenario = ScenarioBuilder::new(SimConfig::default())
        .with_hitboxes(ShipHitboxes::load("assets/hitboxes"))
        .with_level(&library, 1)
        .build()
        .expect("scenario builds");
    let mut engine = scenario.engine;

    // first spawn is due at 0.5s
    engine.run(29, 1.0 / 60.0);
    assert_eq!(engine.pools().active_count(PoolCategory::Mob), 0);
    engine.run(4, 1.0 / 60.0);
    assert_eq!(engine.pools().active_count(PoolCategory::Mob), 1);

    let mob = engine
        .world()
        .entities()
        .into_iter()
        .find(|&id| {
            engine.pools().category_of(id) == Some(PoolCategory::Mob)
                && engine.world().get::<Health>(id).map(|h| h.max) == Some(20.0)
        })
        .expect("scout spawned");
    let pos = engine.world().get::<Position>(mob).unwrap();
    assert_eq!(pos.x, 600.0);
    assert!(pos.y > -40.0);
}

#[test]
fn held_trigger_fills_the_sky() {
    let scenario = ScenarioBuilder::new(SimConfig::default())
        .build()
        .expect("scenario builds");
    let player = scenario.player.unwrap();
    let mut engine = scenario.engine;
    engine.world_mut().set(player, Trigger { pulled: true });

    engine.run(1, 1.0 / 60.0);
    assert_eq!(engine.pools().active_count(PoolCategory::Bullet), 2);

    // 0.15s between volleys, bullets at 600px/s reach the top edge in ~0.8s
    engine.run(59, 1.0 / 60.0);
    let live = engine.pools().active_count(PoolCategory::Bullet);
    assert!(live > 2 && live < 64, "live bullets: {live}");
}

#[test]
fn player_stays_on_screen_under_thrust() {
    let scenario = ScenarioBuilder::new(SimConfig::default())
        .build()
        .expect("scenario builds");
    let player = scenario.player.unwrap();
    let mut engine = scenario.engine;
    let config = engine.config().clone();
    steer_player(engine.world_mut(), player, (1.0, 0.0), &config);

    engine.run(600, 1.0 / 60.0);

    let pos = engine.world().get::<Position>(player).unwrap();
    assert_eq!(pos.x, 1200.0 - 32.0);
    assert_eq!(pos.y, 450.0);
}
