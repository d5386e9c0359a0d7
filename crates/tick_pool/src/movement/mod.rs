//! Projectile movement
//!
//! A per-entity tickable unit that integrates position from velocity and
//! registers with the managed tick registry for exactly the span of its owner's
//! life.

pub mod projectile_movement;

pub use projectile_movement::{MovementPhase, ProjectileMovement, DEFAULT_VELOCITY};

use serde::{Deserialize, Serialize};

/// Motion parameters of a projectile archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementParams {
    /// Speed along the initial direction at activation (0 = keep default velocity)
    pub initial_speed: f32,
    /// Speed limit (0 = no limit)
    pub max_speed: f32,
    /// Multiplier on world gravity
    pub gravity_scale: f32,
    /// Orient the owner along its velocity every tick
    pub rotation_follows_velocity: bool,
    /// Interpret the initial velocity in the owner's local frame
    pub initial_velocity_in_local_space: bool,
    /// Tick from the managed registry instead of the host's default dispatch
    pub managed_tick: bool,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            initial_speed: 8000.0,
            max_speed: 0.0,
            gravity_scale: 0.0,
            rotation_follows_velocity: true,
            initial_velocity_in_local_space: true,
            managed_tick: true,
        }
    }
}
