//! Read-only per-archetype projectile data

use crate::config::ProjectileConfig;
use crate::effects::{EmitterAsset, ShakeAsset, SoundAsset};
use crate::movement::MovementParams;

/// Pool archetype of a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchetypeId(pub u32);

/// Data shared by every instance of one projectile archetype
///
/// Supplied by the host and never mutated by the entities that reference it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileDescriptor {
    /// Archetype this descriptor defines
    pub archetype: ArchetypeId,
    /// Human readable name
    pub name: String,
    /// Emitter spawned on impact
    pub impact_effect: Option<EmitterAsset>,
    /// Sound played on impact
    pub impact_sound: Option<SoundAsset>,
    /// Camera shake played on impact
    pub impact_shake: Option<ShakeAsset>,
    /// Full-strength shake radius
    pub impact_shake_inner_radius: f32,
    /// Radius where the shake fades out
    pub impact_shake_outer_radius: f32,
    /// Looping particles attached while in flight
    pub flight_effect: Option<EmitterAsset>,
    /// Looping audio attached while in flight
    pub flight_sound: Option<SoundAsset>,
    /// Collision sphere radius
    pub collision_radius: f32,
    /// Seconds before expiry (0 = never expires)
    pub life_span: f32,
    /// Motion parameters for the movement unit
    pub movement: MovementParams,
}

impl ProjectileDescriptor {
    /// Build a descriptor from configuration
    pub fn from_config(archetype: ArchetypeId, config: &ProjectileConfig) -> Self {
        Self {
            archetype,
            name: config.name.clone(),
            impact_effect: config.impact_effect.clone().map(EmitterAsset),
            impact_sound: config.impact_sound.clone().map(SoundAsset),
            impact_shake: config.impact_shake.clone().map(ShakeAsset),
            impact_shake_inner_radius: config.impact_shake_inner_radius,
            impact_shake_outer_radius: config.impact_shake_outer_radius,
            flight_effect: config.flight_effect.clone().map(EmitterAsset),
            flight_sound: config.flight_sound.clone().map(SoundAsset),
            collision_radius: config.collision_radius,
            life_span: config.life_span,
            movement: config.movement,
        }
    }
}

impl Default for ProjectileDescriptor {
    fn default() -> Self {
        Self::from_config(ArchetypeId(0), &ProjectileConfig::default())
    }
}
