//! # Tick Pool
//!
//! Frame-driven lifecycle core for short-lived, high-frequency simulation
//! entities such as projectiles.
//!
//! ## Features
//!
//! - **Managed Tick Registry**: One pass per frame over registered units, with
//!   removals deferred to a cleanup queue so a unit may leave mid-pass safely
//! - **Entity Pooling**: Dormant instances are recycled per archetype and reset
//!   to canonical defaults instead of being rebuilt
//! - **Projectile Movement**: Launch velocity from the owner's orientation,
//!   optional gravity, rotation following velocity
//! - **Projectiles**: Impact effects, lifespan expiry and release-to-pool
//!   instead of destruction
//! - **Configuration**: TOML or RON files with serde defaults
//!
//! ## Quick Start
//!
//! ```rust
//! use tick_pool::prelude::*;
//!
//! fn main() -> Result<(), SimError> {
//!     let mut config = SimulationConfig::default();
//!     config.projectile.movement.initial_speed = 500.0;
//!
//!     let mut world = ProjectileWorld::new(config)?;
//!     world.add_collider(Vec3::new(600.0, 0.0, 0.0), 50.0);
//!     let id = world.spawn_projectile(Transform::identity())?;
//!
//!     for _ in 0..120 {
//!         world.step(1.0 / 60.0);
//!     }
//!     assert!(!world.is_active(id));
//!     assert_eq!(world.active_counter().current(), 0);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

// Core lifecycle
pub mod tick;
pub mod pool;
pub mod movement;
pub mod projectile;

// Collaborators and host side
pub mod foundation;
pub mod config;
pub mod error;
pub mod effects;
pub mod collision;
pub mod telemetry;
pub mod world;

#[cfg(test)]
mod tests;

pub use error::{InvariantPolicy, SimError, SimResult};

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        InvariantPolicy, SimError, SimResult,
        foundation::math::{Quat, Transform, Vec3},
        config::{Config, SimulationConfig},
        tick::{TickContext, TickFunction, TickGroup, TickRegistry, TickStatus},
        pool::{EntityId, EntityPoolManager, Poolable, ReleaseRequests},
        movement::{MovementParams, ProjectileMovement},
        projectile::{ArchetypeId, Projectile, ProjectileDescriptor, ProjectileState},
        effects::EffectSink,
        collision::{CollisionListener, HitEvent},
        telemetry::{ActiveCounter, CounterSink},
        world::{FrameReport, ProjectileWorld},
    };
}
