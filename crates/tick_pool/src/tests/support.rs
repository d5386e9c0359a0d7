//! Recording collaborators for tests

use std::cell::RefCell;

use crate::effects::{EffectSink, EmitterAsset, ShakeAsset, SoundAsset};
use crate::foundation::math::{Quat, Vec3};

/// Effect sink that remembers every trigger as `"<kind>:<asset>"`
#[derive(Debug, Default)]
pub struct RecordingEffects {
    calls: RefCell<Vec<String>>,
}

impl RecordingEffects {
    /// Triggers seen so far, oldest first
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Number of triggers of one kind (`"emitter"`, `"sound"` or `"shake"`)
    pub fn count(&self, kind: &str) -> usize {
        let prefix = format!("{kind}:");
        self.calls.borrow().iter().filter(|call| call.starts_with(&prefix)).count()
    }

    fn record(&self, kind: &str, asset: &str) {
        self.calls.borrow_mut().push(format!("{kind}:{asset}"));
    }
}

impl EffectSink for RecordingEffects {
    fn spawn_emitter(&self, emitter: &EmitterAsset, _location: Vec3, _rotation: Quat) {
        self.record("emitter", &emitter.0);
    }

    fn play_sound(&self, sound: &SoundAsset, _location: Vec3) {
        self.record("sound", &sound.0);
    }

    fn play_camera_shake(&self, shake: &ShakeAsset, _epicenter: Vec3, _inner_radius: f32, _outer_radius: f32) {
        self.record("shake", &shake.0);
    }
}
