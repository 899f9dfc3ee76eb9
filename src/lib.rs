pub mod components;
pub mod config;
pub mod ecs;
pub mod engine;
pub mod geometry;
pub mod hitbox;
pub mod level;
pub mod pool;
pub mod scenario;
pub mod systems;

pub use config::SimConfig;
pub use ecs::{EntityId, World};
pub use engine::{Engine, EngineBuilder, FrameSummary};
pub use pool::{PoolCategory, PoolManager};
pub use scenario::{Scenario, ScenarioBuilder};
