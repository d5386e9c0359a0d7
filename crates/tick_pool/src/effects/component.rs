//! Effect components attached to an entity for its whole life

use super::{EmitterAsset, SoundAsset};

/// What an attached effect plays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectKind {
    /// Looping particle system (e.g. a flight trail)
    Particles(EmitterAsset),
    /// Looping audio (e.g. a flight whine)
    Audio(SoundAsset),
}

/// Effect component owned by an entity
///
/// Plays while the entity is alive and must be forcibly completed before the
/// entity is parked, otherwise playback leaks into its next life.
#[derive(Debug, Clone)]
pub struct AttachedEffect {
    kind: EffectKind,
    playing: bool,
    activations: u32,
}

impl AttachedEffect {
    /// Create a stopped effect
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            playing: false,
            activations: 0,
        }
    }

    /// What this component plays
    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    /// Start (or restart) playback
    pub fn activate(&mut self) {
        self.playing = true;
        self.activations += 1;
    }

    /// Halt playback immediately
    pub fn complete(&mut self) {
        if self.playing {
            log::trace!("Completing attached effect {:?}", self.kind);
        }
        self.playing = false;
    }

    /// Whether playback is in progress
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// How many times playback was started
    pub fn activations(&self) -> u32 {
        self.activations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_and_complete() {
        let mut effect = AttachedEffect::new(EffectKind::Particles(EmitterAsset("trail".into())));
        assert!(!effect.is_playing());

        effect.activate();
        assert!(effect.is_playing());
        effect.complete();
        effect.complete();
        assert!(!effect.is_playing());
        assert_eq!(effect.activations(), 1);
    }
}
