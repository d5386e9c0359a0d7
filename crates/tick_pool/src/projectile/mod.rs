//! Poolable projectile entity
//!
//! Owns a movement unit and a collision sphere, explodes once per life on a hit,
//! and asks to be released back to its pool (never destroyed) when its life ends.

pub mod descriptor;
pub mod entity;

pub use descriptor::{ArchetypeId, ProjectileDescriptor};
pub use entity::{LifeEnd, Projectile, ProjectileServices, ProjectileState};
