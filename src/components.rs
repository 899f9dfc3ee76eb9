use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ecs::Component;
use crate::geometry::{rect_vertices, rotate, Vec2};
use crate::level::{LevelEvent, MobRecord, ResolvedLevel, Waypoint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn as_vec(self) -> Vec2 {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub dx: f64,
    pub dy: f64,
    /// Speed cap applied by the movement pass; infinite means uncapped.
    pub max_speed: f64,
}

impl Velocity {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self {
            dx,
            dy,
            max_speed: f64::INFINITY,
        }
    }

    pub fn capped(dx: f64, dy: f64, max_speed: f64) -> Self {
        Self { dx, dy, max_speed }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Acceleration {
    pub ax: f64,
    pub ay: f64,
}

/// Degrees, clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub angle: f64,
    pub angular_speed: f64,
}

/// Handle into the sprite atlas plus the drawn size in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub atlas_key: String,
    pub width: f64,
    pub height: f64,
}

impl Sprite {
    pub fn new(atlas_key: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            atlas_key: atlas_key.into(),
            width,
            height,
        }
    }
}

/// One local-space hitbox piece as authored in the hitbox editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeDef {
    Circle {
        local_x: f64,
        local_y: f64,
        radius: f64,
    },
    #[serde(rename = "square")]
    Rect {
        local_x: f64,
        local_y: f64,
        width: f64,
        height: f64,
        #[serde(default)]
        local_angle_degrees: f64,
    },
}

impl ShapeDef {
    pub fn circle(local_x: f64, local_y: f64, radius: f64) -> Self {
        ShapeDef::Circle {
            local_x,
            local_y,
            radius,
        }
    }

    pub fn rect(local_x: f64, local_y: f64, width: f64, height: f64) -> Self {
        ShapeDef::Rect {
            local_x,
            local_y,
            width,
            height,
            local_angle_degrees: 0.0,
        }
    }

    pub fn offset(&self) -> Vec2 {
        match *self {
            ShapeDef::Circle {
                local_x, local_y, ..
            }
            | ShapeDef::Rect {
                local_x, local_y, ..
            } => (local_x, local_y),
        }
    }

    /// Place this piece in the world for an entity at `origin` facing `angle`.
    pub fn to_world(&self, origin: Vec2, angle: f64) -> WorldShape {
        let (ox, oy) = rotate(self.offset(), angle);
        let center = (origin.0 + ox, origin.1 + oy);
        match *self {
            ShapeDef::Circle { radius, .. } => WorldShape::Circle { center, radius },
            ShapeDef::Rect {
                width,
                height,
                local_angle_degrees,
                ..
            } => {
                let world_angle = angle + local_angle_degrees;
                WorldShape::Rect {
                    center,
                    width,
                    height,
                    angle: world_angle,
                    vertices: rect_vertices(center, width, height, world_angle),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldShape {
    Circle {
        center: Vec2,
        radius: f64,
    },
    Rect {
        center: Vec2,
        width: f64,
        height: f64,
        angle: f64,
        vertices: [Vec2; 4],
    },
}

/// Local shape list plus the world-space cache rebuilt by the transform pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hitbox {
    pub local: Vec<ShapeDef>,
    pub world: Vec<WorldShape>,
}

impl Hitbox {
    pub fn new(local: Vec<ShapeDef>) -> Self {
        Self {
            local,
            world: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub max: f64,
    pub current: f64,
}

impl Health {
    pub fn full(max: f64) -> Self {
        Self { max, current: max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damage(pub f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projectile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Active(pub bool);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visible(pub bool);

/// Which side an entity fights for. Damage never flows within a faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Player,
    Hostile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightPlan {
    pub waypoints: Vec<Waypoint>,
    pub current_step: usize,
    pub completed: bool,
    /// Simulation time the plan was attached, in seconds.
    pub start_time: f64,
}

impl FlightPlan {
    pub fn new(waypoints: Vec<Waypoint>, start_time: f64) -> Self {
        let completed = waypoints.is_empty();
        Self {
            waypoints,
            current_step: 0,
            completed,
            start_time,
        }
    }

    pub fn current(&self) -> Option<&Waypoint> {
        if self.completed {
            return None;
        }
        self.waypoints.get(self.current_step)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LevelManager {
    pub level_id: u32,
    pub events: Vec<LevelEvent>,
    pub elapsed: f64,
    /// Indexes into `events` that already fired.
    pub fired: HashSet<usize>,
    pub mobs: HashMap<u32, MobRecord>,
    pub flight_plans: HashMap<u32, Vec<Waypoint>>,
}

impl LevelManager {
    pub fn new(level_id: u32, resolved: ResolvedLevel) -> Self {
        Self {
            level_id,
            events: resolved.events,
            elapsed: 0.0,
            fired: HashSet::new(),
            mobs: resolved.mobs,
            flight_plans: resolved.flight_plans,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.fired.len() >= self.events.len()
    }
}

/// Bullet prototype handed to every shot a weapon fires.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileTemplate {
    pub sprite: Sprite,
    pub hitbox: Vec<ShapeDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerWeapon {
    /// Muzzle positions relative to the ship centre, unrotated.
    pub muzzles: Vec<Vec2>,
    pub projectile: ProjectileTemplate,
    pub speed: f64,
    pub damage: f64,
    /// Seconds between volleys.
    pub fire_interval: f64,
    pub cooldown: f64,
}

/// Firing intent written by the host from its input state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Trigger {
    pub pulled: bool,
}

impl Component for Position {}
impl Component for Velocity {}
impl Component for Acceleration {}
impl Component for Rotation {}
impl Component for Sprite {}
impl Component for Hitbox {}
impl Component for Health {}
impl Component for Damage {}
impl Component for Projectile {}
impl Component for Active {}
impl Component for Visible {}
impl Component for Faction {}
impl Component for FlightPlan {}
impl Component for LevelManager {}
impl Component for PlayerWeapon {}
impl Component for Trigger {}
