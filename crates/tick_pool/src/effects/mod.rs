//! Effect playback collaborators
//!
//! Visual emitters, audio cues and camera shakes are played by the host. The
//! core only fires them through [`EffectSink`] and keeps the attached effect
//! components of an entity in a known state across pooled lives.

pub mod component;

pub use component::{AttachedEffect, EffectKind};

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Quat, Vec3};

/// Opaque reference to a visual emitter asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmitterAsset(pub String);

/// Opaque reference to an audio cue asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundAsset(pub String);

/// Opaque reference to a camera shake asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShakeAsset(pub String);

/// Fire-and-forget effect triggers provided by the host
pub trait EffectSink {
    /// Spawn a one-shot emitter at a location and orientation
    fn spawn_emitter(&self, emitter: &EmitterAsset, location: Vec3, rotation: Quat);

    /// Play a one-shot sound at a location
    fn play_sound(&self, sound: &SoundAsset, location: Vec3);

    /// Shake cameras near `epicenter`, full strength inside `inner_radius`, fading to `outer_radius`
    fn play_camera_shake(&self, shake: &ShakeAsset, epicenter: Vec3, inner_radius: f32, outer_radius: f32);
}

/// Sink that drops every request
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEffectSink;

impl EffectSink for NullEffectSink {
    fn spawn_emitter(&self, _emitter: &EmitterAsset, _location: Vec3, _rotation: Quat) {}

    fn play_sound(&self, _sound: &SoundAsset, _location: Vec3) {}

    fn play_camera_shake(&self, _shake: &ShakeAsset, _epicenter: Vec3, _inner_radius: f32, _outer_radius: f32) {}
}

/// Sink that logs every request; used by headless hosts
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEffectSink;

impl EffectSink for LoggingEffectSink {
    fn spawn_emitter(&self, emitter: &EmitterAsset, location: Vec3, _rotation: Quat) {
        log::debug!("emitter {} at {:?}", emitter.0, location.as_slice());
    }

    fn play_sound(&self, sound: &SoundAsset, location: Vec3) {
        log::debug!("sound {} at {:?}", sound.0, location.as_slice());
    }

    fn play_camera_shake(&self, shake: &ShakeAsset, epicenter: Vec3, inner_radius: f32, outer_radius: f32) {
        log::debug!(
            "camera shake {} at {:?} (radius {inner_radius}..{outer_radius})",
            shake.0,
            epicenter.as_slice()
        );
    }
}
