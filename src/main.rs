use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::Parser;

use space_vault::{
    components::{Health, Trigger},
    config::SimConfig,
    level::LevelLoader,
    scenario::{ScenarioBuilder, ShipHitboxes},
    systems::CollisionSystem,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Space Vault headless simulation runner")]
struct Cli {
    /// Path to a simulation config YAML file (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Level library YAML file
    #[arg(long, default_value = "levels/campaign.yaml")]
    levels: PathBuf,

    /// Level to play from the library
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Directory holding player.json, bullet.json and mob.json hitboxes
    #[arg(long, default_value = "assets/hitboxes")]
    hitboxes: PathBuf,

    /// Keep the player's trigger held for the whole run
    #[arg(long)]
    fire: bool,

    /// Pace frames to the configured frame rate instead of stepping headless
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SimConfig::from_yaml(path)?,
        None => SimConfig::default(),
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    let library = LevelLoader::new(".").load(&cli.levels)?;
    let scenario = ScenarioBuilder::new(config)
        .with_hitboxes(ShipHitboxes::load(&cli.hitboxes))
        .with_level(&library, cli.level)
        .build()?;
    let mut engine = scenario.engine;
    let player = scenario.player;

    if let Some(player) = player {
        engine.world_mut().set(player, Trigger { pulled: cli.fire });
    }

    let dt = engine.config().frame_dt();
    let frame_budget = Duration::from_secs_f64(dt);
    let report_every = u64::from(engine.config().screen.target_fps.max(1));
    let mut contacts = 0usize;
    let mut hits = 0usize;

    for _ in 0..cli.frames {
        let started = Instant::now();
        engine.advance(dt);

        if let Some(collision) = engine.get_system::<CollisionSystem>() {
            contacts += collision.contacts().len();
            hits += collision.hits().len();
        }
        let summary = engine.summary();
        if summary.frame % report_every == 0 {
            log::info!(
                "t={:.1}s bullets={} mobs={} contacts={}",
                summary.elapsed,
                summary.active_bullets,
                summary.active_mobs,
                summary.contacts.len()
            );
        }

        if cli.realtime {
            if let Some(rest) = frame_budget.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }
    }

    let player_health = player
        .and_then(|id| engine.world().get::<Health>(id))
        .map_or(0.0, |health| health.current);
    println!(
        "Level {} ran for {} frames ({:.1}s). Contacts: {}, hits: {}, player health: {}",
        cli.level,
        cli.frames,
        engine.elapsed(),
        contacts,
        hits,
        player_health
    );
    Ok(())
}
