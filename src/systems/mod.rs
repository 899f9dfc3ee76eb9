mod boundary;
mod cleanup;
mod collision;
mod culling;
mod flight;
mod level;
mod movement;
mod rotation;
mod transform;
mod weapon;

pub use boundary::BoundarySystem;
pub use cleanup::CleanupSystem;
pub use collision::CollisionSystem;
pub use culling::CullingSystem;
pub use flight::FlightSystem;
pub use level::LevelSystem;
pub use movement::MovementSystem;
pub use rotation::RotationSystem;
pub use transform::TransformSystem;
pub use weapon::WeaponSystem;

use crate::components::{Active, Visible};
use crate::ecs::{EntityId, World};

/// Live and not parked in a pool. A missing flag counts as set.
pub(crate) fn is_active(world: &World, id: EntityId) -> bool {
    world.is_alive(id) && world.get::<Active>(id).map_or(true, |a| a.0)
}

/// Active and on (or near) the screen.
pub(crate) fn is_shown(world: &World, id: EntityId) -> bool {
    is_active(world, id) && world.get::<Visible>(id).map_or(true, |v| v.0)
}
