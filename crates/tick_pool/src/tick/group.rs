//! Tick groups with explicit ordering relative to the physics step

use serde::{Deserialize, Serialize};

/// Frame phase a tick registry runs in
///
/// Groups execute in declaration order; the host's physics step sits between
/// [`TickGroup::PrePhysics`] and [`TickGroup::DuringPhysics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum TickGroup {
    /// Before the physics step
    #[default]
    PrePhysics = 0,
    /// Alongside the physics step, after collision results are available
    DuringPhysics = 1,
    /// After physics has settled
    PostPhysics = 2,
    /// Late work after everything else this frame
    PostUpdateWork = 3,
}

impl TickGroup {
    /// All groups in execution order
    pub const ALL: [Self; 4] = [
        Self::PrePhysics,
        Self::DuringPhysics,
        Self::PostPhysics,
        Self::PostUpdateWork,
    ];

    /// Whether this group runs before the physics step
    pub fn runs_before_physics(self) -> bool {
        self < Self::DuringPhysics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_ordering() {
        assert!(TickGroup::PrePhysics < TickGroup::DuringPhysics);
        assert!(TickGroup::PostPhysics < TickGroup::PostUpdateWork);
        assert!(TickGroup::PrePhysics.runs_before_physics());
        assert!(!TickGroup::PostPhysics.runs_before_physics());
    }

    #[test]
    fn test_default_is_pre_physics() {
        assert_eq!(TickGroup::default(), TickGroup::PrePhysics);
    }
}
