//! Simulation tuning, loaded once at startup and never mutated.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Vec2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub screen: ScreenConfig,
    pub physics: PhysicsConfig,
    pub collision: CollisionConfig,
    pub pools: PoolConfig,
    pub spawning: SpawnConfig,
    pub player: PlayerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f64,
    pub height: f64,
    pub target_fps: u32,
    /// Pixels beyond the screen edge that still count as visible.
    pub camera_buffer: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fraction of velocity shed per second on an axis with no thrust.
    pub damping_factor: f64,
    pub velocity_snap: f64,
    /// Distance under which a flight-path waypoint counts as reached.
    pub arrival_epsilon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub cell_size: f64,
    /// Grid extent in cells; derived from the screen when unset.
    pub grid_columns: Option<u32>,
    pub grid_rows: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub bullet_capacity: usize,
    pub mob_capacity: usize,
    /// Where idle pooled entities are parked.
    pub park_x: f64,
    pub park_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub fallback_x: f64,
    pub fallback_y: f64,
    pub fallback_health: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_speed: f64,
    pub acceleration: f64,
    pub health: f64,
    pub bullet_speed: f64,
    pub bullet_damage: f64,
    pub fire_interval: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 900.0,
            target_fps: 60,
            camera_buffer: 50.0,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            damping_factor: 1.0,
            velocity_snap: 0.5,
            arrival_epsilon: 1.0,
        }
    }
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            cell_size: 100.0,
            grid_columns: None,
            grid_rows: None,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            bullet_capacity: 64,
            mob_capacity: 24,
            park_x: -1000.0,
            park_y: -1000.0,
        }
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            fallback_x: 600.0,
            fallback_y: -40.0,
            fallback_health: 10.0,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_speed: 250.0,
            acceleration: 1000.0,
            health: 100.0,
            bullet_speed: 600.0,
            bullet_damage: 10.0,
            fire_interval: 0.15,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl SimConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen.width <= 0.0 || self.screen.height <= 0.0 {
            return Err(ConfigError::Validation(
                "screen dimensions must be positive".to_string(),
            ));
        }
        if self.collision.cell_size <= 0.0 {
            return Err(ConfigError::Validation(
                "collision cell_size must be positive".to_string(),
            ));
        }
        if self.physics.damping_factor < 0.0 {
            return Err(ConfigError::Validation(
                "damping_factor must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Seconds per frame at the target rate.
    pub fn frame_dt(&self) -> f64 {
        1.0 / f64::from(self.screen.target_fps.max(1))
    }

    pub fn park_point(&self) -> Vec2 {
        (self.pools.park_x, self.pools.park_y)
    }

    pub fn fallback_spawn(&self) -> Vec2 {
        (self.spawning.fallback_x, self.spawning.fallback_y)
    }

    /// Grid extent in cells, covering the screen unless overridden.
    pub fn grid_extent(&self) -> (i64, i64) {
        let cell = self.collision.cell_size;
        let columns = self
            .collision
            .grid_columns
            .map(i64::from)
            .unwrap_or_else(|| (self.screen.width / cell).ceil() as i64);
        let rows = self
            .collision
            .grid_rows
            .map(i64::from)
            .unwrap_or_else(|| (self.screen.height / cell).ceil() as i64);
        (columns, rows)
    }

    /// Screen rectangle grown by the camera buffer: (min_x, min_y, max_x, max_y).
    pub fn visible_bounds(&self) -> (f64, f64, f64, f64) {
        let buffer = self.screen.camera_buffer;
        (
            -buffer,
            -buffer,
            self.screen.width + buffer,
            self.screen.height + buffer,
        )
    }
}
