//! Level, flight plan and mob definitions
//!
//! Rows mirror the tables of the game's definition store. [`LevelLibrary`]
//! reads them from a YAML document; anything else able to answer the
//! [`LevelSource`] queries can stand in for it.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::components::ShapeDef;

fn default_waypoint_speed() -> f64 {
    100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SpawnMob,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelEvent {
    #[serde(rename = "Level")]
    pub level: u32,
    /// Seconds since the level started.
    #[serde(rename = "Event_Start")]
    pub event_start: f64,
    #[serde(rename = "Event")]
    pub event: EventKind,
    #[serde(rename = "Mob_ID", default)]
    pub mob_id: Option<u32>,
    #[serde(rename = "Flight_Plan_ID", default)]
    pub flight_plan_id: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointAction {
    #[default]
    Move,
    Exit,
    Fire,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Speed", default = "default_waypoint_speed")]
    pub speed: f64,
    /// Seconds after the plan started before this waypoint may be pursued.
    #[serde(rename = "Waypoint_Time_Offset", default)]
    pub time_offset: f64,
    #[serde(rename = "Action", default)]
    pub action: WaypointAction,
}

impl Waypoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            speed: default_waypoint_speed(),
            time_offset: 0.0,
            action: WaypointAction::Move,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_offset(mut self, time_offset: f64) -> Self {
        self.time_offset = time_offset;
        self
    }

    pub fn with_action(mut self, action: WaypointAction) -> Self {
        self.action = action;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlanRecord {
    #[serde(rename = "Flight_Plan_ID")]
    pub id: u32,
    #[serde(rename = "Waypoints", default)]
    pub waypoints: Vec<Waypoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobRecord {
    #[serde(rename = "Mob_ID")]
    pub id: u32,
    #[serde(rename = "Health")]
    pub health: f64,
    #[serde(rename = "Sprite", default)]
    pub sprite: Option<String>,
    /// Overrides the pool's default hitbox when non-empty.
    #[serde(rename = "Hitbox", default)]
    pub hitbox: Vec<ShapeDef>,
}

/// Read side of the definition store.
pub trait LevelSource {
    fn events_for_level(&self, level: u32) -> Vec<LevelEvent>;
    fn flight_plan(&self, id: u32) -> Option<Vec<Waypoint>>;
    fn mob(&self, id: u32) -> Option<MobRecord>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelLibrary {
    #[serde(default)]
    pub level_events: Vec<LevelEvent>,
    #[serde(default)]
    pub flight_plans: Vec<FlightPlanRecord>,
    #[serde(default)]
    pub mobs: Vec<MobRecord>,
}

impl LevelLibrary {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let library: LevelLibrary =
            serde_yaml::from_str(text).context("Failed to parse level library")?;
        Ok(library)
    }
}

impl LevelSource for LevelLibrary {
    fn events_for_level(&self, level: u32) -> Vec<LevelEvent> {
        let mut events: Vec<_> = self
            .level_events
            .iter()
            .filter(|event| event.level == level)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.event_start.total_cmp(&b.event_start));
        events
    }

    fn flight_plan(&self, id: u32) -> Option<Vec<Waypoint>> {
        self.flight_plans
            .iter()
            .find(|plan| plan.id == id)
            .map(|plan| plan.waypoints.clone())
    }

    fn mob(&self, id: u32) -> Option<MobRecord> {
        self.mobs.iter().find(|mob| mob.id == id).cloned()
    }
}

pub struct LevelLoader {
    base_dir: PathBuf,
}

impl LevelLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<LevelLibrary> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read level file {}", path.display()))?;
        LevelLibrary::from_yaml_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Everything a level manager caches up front so no lookups happen mid-frame.
pub struct ResolvedLevel {
    pub events: Vec<LevelEvent>,
    pub mobs: HashMap<u32, MobRecord>,
    pub flight_plans: HashMap<u32, Vec<Waypoint>>,
}

pub fn resolve_level(source: &dyn LevelSource, level: u32) -> ResolvedLevel {
    let events = source.events_for_level(level);
    let mut mobs = HashMap::new();
    let mut flight_plans = HashMap::new();
    for event in &events {
        if let Some(mob_id) = event.mob_id {
            if !mobs.contains_key(&mob_id) {
                match source.mob(mob_id) {
                    Some(record) => {
                        mobs.insert(mob_id, record);
                    }
                    None => log::warn!("level {level}: mob {mob_id} not found"),
                }
            }
        }
        if let Some(plan_id) = event.flight_plan_id {
            if !flight_plans.contains_key(&plan_id) {
                match source.flight_plan(plan_id) {
                    Some(waypoints) => {
                        flight_plans.insert(plan_id, waypoints);
                    }
                    None => log::warn!("level {level}: flight plan {plan_id} not found"),
                }
            }
        }
    }
    if events.is_empty() {
        log::warn!("level {level} has no events");
    }
    ResolvedLevel {
        events,
        mobs,
        flight_plans,
    }
}
