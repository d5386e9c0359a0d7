//! Projectile entity lifecycle
//!
//! ```text
//! Dormant --begin_play--> Active --explode / expire--> Ending --end_play--> Dormant
//! ```
//!
//! `Ending` means a release has been requested and the entity is waiting for the
//! host to hand it back to the pool; it no longer reacts to hits or expiry.

use std::rc::Rc;

use super::{ArchetypeId, ProjectileDescriptor};
use crate::collision::{BoundingSphere, CollisionListener, HitEvent};
use crate::effects::{AttachedEffect, EffectKind, EffectSink};
use crate::error::TickError;
use crate::foundation::math::{Transform, Vec3};
use crate::movement::ProjectileMovement;
use crate::pool::{EntityId, Poolable, ReleaseRequests};
use crate::telemetry::CounterSink;
use crate::tick::{TickFunction, TickRegistry};

/// How a life ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeEnd {
    /// Hit something and played its impact effects
    Exploded,
    /// Ran out of lifespan without hitting anything
    Expired,
}

/// Lifecycle state of a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileState {
    /// Parked in (or about to enter) the pool
    Dormant,
    /// In flight
    Active,
    /// Release requested, waiting for the host
    Ending(LifeEnd),
}

/// Collaborators injected into every projectile at construction
#[derive(Clone)]
pub struct ProjectileServices {
    /// Live-instance counter
    pub counter: Rc<dyn CounterSink>,
    /// Effect playback
    pub effects: Rc<dyn EffectSink>,
    /// Channel to the owning pool
    pub releases: ReleaseRequests,
}

impl std::fmt::Debug for ProjectileServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectileServices")
            .field("pending_releases", &self.releases.len())
            .finish_non_exhaustive()
    }
}

/// Poolable projectile
#[derive(Debug)]
pub struct Projectile {
    id: EntityId,
    descriptor: Rc<ProjectileDescriptor>,
    transform: Transform,
    movement: ProjectileMovement,
    attached: Vec<AttachedEffect>,
    state: ProjectileState,
    lives: u32,
    services: ProjectileServices,
}

impl Projectile {
    /// Construct a dormant projectile
    ///
    /// `tick` becomes the movement unit's tick function.
    pub fn new(
        id: EntityId,
        descriptor: Rc<ProjectileDescriptor>,
        tick: TickFunction,
        services: ProjectileServices,
    ) -> Self {
        let mut attached = Vec::new();
        if let Some(emitter) = &descriptor.flight_effect {
            attached.push(AttachedEffect::new(EffectKind::Particles(emitter.clone())));
        }
        if let Some(sound) = &descriptor.flight_sound {
            attached.push(AttachedEffect::new(EffectKind::Audio(sound.clone())));
        }

        Self {
            id,
            movement: ProjectileMovement::new(descriptor.movement, tick),
            descriptor,
            transform: Transform::identity(),
            attached,
            state: ProjectileState::Dormant,
            lives: 0,
            services,
        }
    }

    /// Start a life at `spawn`
    ///
    /// Counts the projectile as active and hands its movement unit to the managed
    /// registry. Activating twice without an intervening [`end_play`](Self::end_play)
    /// is refused.
    pub fn begin_play(&mut self, spawn: Transform, registry: &mut TickRegistry) -> Result<(), TickError> {
        if self.state != ProjectileState::Dormant {
            return Err(TickError::AlreadyRegistered(self.movement.tick_function().id()));
        }

        self.transform = spawn;
        self.movement.activate(&mut self.transform, registry)?;
        self.services.counter.increment();
        for effect in &mut self.attached {
            effect.activate();
        }

        self.state = ProjectileState::Active;
        self.lives += 1;
        log::trace!("{:?} began life {} at {:?}", self.id, self.lives, self.transform.position.as_slice());
        Ok(())
    }

    /// End the current life ahead of going dormant
    ///
    /// Uncounts the projectile, halts attached playback and queues the movement
    /// unit's removal from the registry.
    pub fn end_play(&mut self, registry: &mut TickRegistry) -> Result<(), TickError> {
        if self.state == ProjectileState::Dormant {
            return Err(TickError::NotRegistered(self.movement.tick_function().id()));
        }

        self.services.counter.decrement();
        self.halt_attached_effects();
        self.state = ProjectileState::Dormant;
        self.movement.deactivate(registry)
    }

    /// Play impact effects and ask to be released
    ///
    /// Runs at most once per life. Calling it on a projectile that is already
    /// ending or dormant is tolerated: it is logged and does nothing.
    pub fn explode(&mut self) -> bool {
        if !self.is_alive() {
            log::warn!("explode() on {:?} while {:?}; ignoring", self.id, self.state);
            return false;
        }

        let location = self.transform.position;
        let effects = &self.services.effects;
        if let Some(emitter) = &self.descriptor.impact_effect {
            effects.spawn_emitter(emitter, location, self.transform.rotation);
        }
        if let Some(sound) = &self.descriptor.impact_sound {
            effects.play_sound(sound, location);
        }
        if let Some(shake) = &self.descriptor.impact_shake {
            effects.play_camera_shake(
                shake,
                location,
                self.descriptor.impact_shake_inner_radius,
                self.descriptor.impact_shake_outer_radius,
            );
        }

        self.finish(LifeEnd::Exploded);
        true
    }

    /// Lifespan ran out: skip destruction and ask to be released, no effects
    pub fn life_span_expired(&mut self) -> bool {
        if !self.is_alive() {
            log::debug!("{:?} expired while {:?}; ignoring", self.id, self.state);
            return false;
        }
        self.finish(LifeEnd::Expired);
        true
    }

    /// Advance the movement unit by one frame
    pub fn tick(&mut self, delta_time: f32, gravity: &Vec3) {
        self.movement.tick(&mut self.transform, delta_time, gravity);
    }

    /// Entity handle
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Archetype data
    pub fn descriptor(&self) -> &ProjectileDescriptor {
        &self.descriptor
    }

    /// Current transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Movement unit
    pub fn movement(&self) -> &ProjectileMovement {
        &self.movement
    }

    /// Mutable movement unit
    pub fn movement_mut(&mut self) -> &mut ProjectileMovement {
        &mut self.movement
    }

    /// World-space collision volume
    pub fn collision_volume(&self) -> BoundingSphere {
        BoundingSphere::new(self.transform.position, self.descriptor.collision_radius)
    }

    /// Effect components attached for the whole life
    pub fn attached_effects(&self) -> &[AttachedEffect] {
        &self.attached
    }

    /// Lifecycle state
    pub fn state(&self) -> ProjectileState {
        self.state
    }

    /// Liveness predicate: in flight and not already ending
    pub fn is_alive(&self) -> bool {
        self.state == ProjectileState::Active
    }

    /// Number of lives started, across pooled reuse
    pub fn lives(&self) -> u32 {
        self.lives
    }

    fn finish(&mut self, end: LifeEnd) {
        self.state = ProjectileState::Ending(end);
        // Pooling is in use: release, never destroy
        self.services.releases.request(self.id);
        log::trace!("{:?} ended life {} ({end:?})", self.id, self.lives);
    }

    fn halt_attached_effects(&mut self) {
        for effect in &mut self.attached {
            effect.complete();
        }
    }
}

impl CollisionListener for Projectile {
    fn on_hit(&mut self, event: &HitEvent) {
        log::trace!("{:?} hit {:?}", self.id, event.other);
        self.explode();
    }
}

impl Poolable for Projectile {
    type Archetype = ArchetypeId;

    fn archetype(&self) -> ArchetypeId {
        self.descriptor.archetype
    }

    fn reset_for_reuse(&mut self) {
        self.services.releases.cancel(self.id);
        self.transform = Transform::identity();
        self.movement.reset_for_reuse();
        self.halt_attached_effects();
        self.state = ProjectileState::Dormant;
    }

    fn end_of_life(&mut self) {
        self.halt_attached_effects();
    }
}
