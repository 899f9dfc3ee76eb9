//! Entity Component System (ECS) implementation
//!
//! Components live in independent per-type tables keyed by entity id.

pub mod component;
pub mod entity;
pub mod world;

pub use component::{Component, ComponentStorage, TypedComponentStorage};
pub use entity::{EntityAllocator, EntityId};
pub use world::World;
