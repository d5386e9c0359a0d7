//! Movement unit for pooled projectiles
//!
//! State machine:
//! `Uninitialized --activate--> Running --deactivate--> DeregisterQueued`,
//! and back to `Uninitialized` when the owner is reset for reuse.

use super::MovementParams;
use crate::error::TickError;
use crate::foundation::math::{rotation_along, Transform, Vec3};
use crate::tick::{TickFunction, TickRegistry};

/// Canonical velocity restored before every activation
pub const DEFAULT_VELOCITY: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// Registration state of a movement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementPhase {
    /// Constructed or reset; not in any registry
    Uninitialized,
    /// Registered and receiving ticks
    Running,
    /// Removal queued; gone after the next frame boundary
    DeregisterQueued,
}

/// Tickable movement unit owned by a projectile
#[derive(Debug, Clone)]
pub struct ProjectileMovement {
    params: MovementParams,
    velocity: Vec3,
    tick: TickFunction,
    phase: MovementPhase,
}

impl ProjectileMovement {
    /// Create an uninitialized unit
    pub fn new(params: MovementParams, tick: TickFunction) -> Self {
        Self {
            params,
            velocity: DEFAULT_VELOCITY,
            tick,
            phase: MovementPhase::Uninitialized,
        }
    }

    /// Reset velocity and derive the launch velocity from the owner's orientation
    pub fn initialize(&mut self, owner: &mut Transform) {
        // Pooled reuse skips construction, so the default is restored here
        self.velocity = DEFAULT_VELOCITY;

        if self.params.initial_speed > 0.0 {
            self.velocity = self.velocity.normalize() * self.params.initial_speed;
        }
        if self.params.initial_velocity_in_local_space {
            self.velocity = owner.transform_vector(self.velocity);
        }
        self.velocity = self.limit(self.velocity);

        if self.params.rotation_follows_velocity {
            if let Some(rotation) = rotation_along(&self.velocity) {
                owner.rotation = rotation;
            }
        }
    }

    /// Initialize and join the managed registry
    ///
    /// Activating a unit that is already running is a programming error and is
    /// reported as [`TickError::AlreadyRegistered`] without touching any state.
    /// Units with `managed_tick` off stay on the default dispatch path.
    pub fn activate(&mut self, owner: &mut Transform, registry: &mut TickRegistry) -> Result<(), TickError> {
        if self.phase == MovementPhase::Running {
            return Err(TickError::AlreadyRegistered(self.tick.id()));
        }
        self.initialize(owner);
        if self.params.managed_tick {
            registry.register(&mut self.tick)?;
        }
        self.phase = MovementPhase::Running;
        Ok(())
    }

    /// Queue removal from the managed registry
    pub fn deactivate(&mut self, registry: &mut TickRegistry) -> Result<(), TickError> {
        if self.phase != MovementPhase::Running {
            return Err(TickError::NotRegistered(self.tick.id()));
        }
        if self.params.managed_tick {
            registry.deregister(self.tick.id())?;
            self.phase = MovementPhase::DeregisterQueued;
        } else {
            self.tick.set_enabled(false);
            self.phase = MovementPhase::Uninitialized;
        }
        Ok(())
    }

    /// Return to the constructed state for the next pooled life
    pub fn reset_for_reuse(&mut self) {
        self.velocity = DEFAULT_VELOCITY;
        self.tick.restore_default_path();
        self.phase = MovementPhase::Uninitialized;
    }

    /// Advance the owner by one frame
    pub fn tick(&mut self, owner: &mut Transform, delta_time: f32, gravity: &Vec3) {
        if self.params.gravity_scale != 0.0 {
            self.velocity += gravity * (self.params.gravity_scale * delta_time);
            self.velocity = self.limit(self.velocity);
        }

        owner.position += self.velocity * delta_time;

        if self.params.rotation_follows_velocity {
            if let Some(rotation) = rotation_along(&self.velocity) {
                owner.rotation = rotation;
            }
        }
    }

    /// Stop all movement
    pub fn stop(&mut self) {
        self.velocity = Vec3::zeros();
    }

    /// Current velocity
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Override the velocity
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = self.limit(velocity);
    }

    /// Motion parameters
    pub fn params(&self) -> &MovementParams {
        &self.params
    }

    /// Registration state
    pub fn phase(&self) -> MovementPhase {
        self.phase
    }

    /// Tick function of this unit
    pub fn tick_function(&self) -> &TickFunction {
        &self.tick
    }

    /// Mutable tick function of this unit
    pub fn tick_function_mut(&mut self) -> &mut TickFunction {
        &mut self.tick
    }

    fn limit(&self, velocity: Vec3) -> Vec3 {
        if self.params.max_speed > 0.0 {
            velocity.cap_magnitude(self.params.max_speed)
        } else {
            velocity
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use crate::pool::EntityId;
    use crate::tick::{DispatchPath, TickGroup};
    use approx::assert_relative_eq;

    fn unit(params: MovementParams) -> (TickRegistry, ProjectileMovement) {
        let mut registry = TickRegistry::new(TickGroup::PrePhysics);
        let tick = registry.create_tick_function(EntityId::default());
        (registry, ProjectileMovement::new(params, tick))
    }

    #[test]
    fn test_activation_launches_along_owner_forward() {
        let (mut registry, mut movement) = unit(MovementParams::default());
        let yaw = Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2);
        let mut owner = Transform::from_position_rotation(Vec3::zeros(), yaw);

        movement.activate(&mut owner, &mut registry).unwrap();
        assert_relative_eq!(movement.velocity(), Vec3::new(0.0, 8000.0, 0.0), epsilon = 1e-2);
        assert_eq!(movement.phase(), MovementPhase::Running);
        assert!(registry.is_registered(movement.tick_function().id()));
        assert_eq!(movement.tick_function().path(), DispatchPath::Managed);
    }

    #[test]
    fn test_activation_resets_stale_velocity() {
        let (mut registry, mut movement) = unit(MovementParams::default());
        movement.set_velocity(Vec3::new(0.0, 0.0, -5.0));
        let mut owner = Transform::identity();

        movement.activate(&mut owner, &mut registry).unwrap();
        assert_relative_eq!(movement.velocity(), Vec3::new(8000.0, 0.0, 0.0), epsilon = 1e-3);
    }

    #[test]
    fn test_double_activation_is_rejected() {
        let (mut registry, mut movement) = unit(MovementParams::default());
        let mut owner = Transform::identity();
        movement.activate(&mut owner, &mut registry).unwrap();

        let err = movement.activate(&mut owner, &mut registry).unwrap_err();
        assert_eq!(err, TickError::AlreadyRegistered(movement.tick_function().id()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_deactivation_queues_removal() {
        let (mut registry, mut movement) = unit(MovementParams::default());
        let mut owner = Transform::identity();
        movement.activate(&mut owner, &mut registry).unwrap();
        movement.deactivate(&mut registry).unwrap();

        let id = movement.tick_function().id();
        assert_eq!(movement.phase(), MovementPhase::DeregisterQueued);
        assert!(registry.is_pending_removal(id));
        assert!(movement.deactivate(&mut registry).is_err());

        registry.execute_frame(0.1, |_, _| Ok(crate::tick::TickStatus::Ticked));
        assert!(!registry.is_registered(id));
    }

    #[test]
    fn test_tick_integrates_position() {
        let params = MovementParams { initial_speed: 10.0, ..MovementParams::default() };
        let (mut registry, mut movement) = unit(params);
        let mut owner = Transform::identity();
        movement.activate(&mut owner, &mut registry).unwrap();

        movement.tick(&mut owner, 0.5, &Vec3::new(0.0, 0.0, -980.0));
        assert_relative_eq!(owner.position, Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_gravity_scale_bends_path() {
        let params = MovementParams {
            initial_speed: 10.0,
            gravity_scale: 1.0,
            ..MovementParams::default()
        };
        let (mut registry, mut movement) = unit(params);
        let mut owner = Transform::identity();
        movement.activate(&mut owner, &mut registry).unwrap();

        movement.tick(&mut owner, 0.1, &Vec3::new(0.0, 0.0, -10.0));
        assert_relative_eq!(movement.velocity(), Vec3::new(10.0, 0.0, -1.0), epsilon = 1e-5);
        assert!(owner.position.z < 0.0);
        // Nose follows the velocity downwards
        assert!(owner.forward().z < 0.0);
    }

    #[test]
    fn test_max_speed_limit() {
        let params = MovementParams { max_speed: 100.0, ..MovementParams::default() };
        let (mut registry, mut movement) = unit(params);
        let mut owner = Transform::identity();
        movement.activate(&mut owner, &mut registry).unwrap();
        assert!(movement.velocity().magnitude() <= 100.0 + 1e-3);
    }

    #[test]
    fn test_reset_for_reuse_restores_defaults() {
        let (mut registry, mut movement) = unit(MovementParams::default());
        let mut owner = Transform::identity();
        movement.activate(&mut owner, &mut registry).unwrap();
        movement.deactivate(&mut registry).unwrap();
        movement.reset_for_reuse();

        assert_eq!(movement.velocity(), DEFAULT_VELOCITY);
        assert_eq!(movement.phase(), MovementPhase::Uninitialized);
        assert!(movement.tick_function().on_default_path());

        // Recycled within the same frame: the queued removal is cancelled
        movement.activate(&mut owner, &mut registry).unwrap();
        assert!(!registry.is_pending_removal(movement.tick_function().id()));
    }

    #[test]
    fn test_unmanaged_unit_stays_on_default_path() {
        let params = MovementParams { managed_tick: false, ..MovementParams::default() };
        let (mut registry, mut movement) = unit(params);
        let mut owner = Transform::identity();

        movement.activate(&mut owner, &mut registry).unwrap();
        assert!(registry.is_empty());
        assert!(movement.tick_function().on_default_path());

        movement.deactivate(&mut registry).unwrap();
        assert!(!movement.tick_function().is_enabled());
        movement.reset_for_reuse();
        assert!(movement.tick_function().is_enabled());
    }

    #[test]
    fn test_stop() {
        let (_registry, mut movement) = unit(MovementParams::default());
        movement.stop();
        assert_eq!(movement.velocity(), Vec3::zeros());
    }
}
