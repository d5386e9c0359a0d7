//! Entity pooling
//!
//! Short-lived simulation entities are parked in a dormant set when their life
//! ends and handed out again, fully reset, instead of being destroyed and
//! rebuilt for every spawn.

pub mod manager;
pub mod requests;

pub use manager::{Acquired, EntityPoolManager, PoolStats, SlotState};
pub use requests::ReleaseRequests;

use std::fmt::Debug;
use std::hash::Hash;

slotmap::new_key_type! {
    /// Generational handle of a pooled entity
    ///
    /// Stays valid across dormant/active transitions; only pool teardown retires it.
    pub struct EntityId;
}

/// Lifecycle hooks the pool needs from an entity
pub trait Poolable {
    /// Key the dormant set is partitioned by
    type Archetype: Copy + Eq + Hash + Debug;

    /// Archetype this instance belongs to
    fn archetype(&self) -> Self::Archetype;

    /// Restore every per-life field to its canonical default
    ///
    /// Runs on recycled instances before they are handed out again; pooled reuse
    /// does not re-run construction.
    fn reset_for_reuse(&mut self);

    /// End-of-life cleanup when the instance is parked (halt in-flight playback)
    fn end_of_life(&mut self);
}
