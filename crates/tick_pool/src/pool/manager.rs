//! Entity Pool Manager
//!
//! Owns the active/dormant lifecycle of reusable entities, keyed by archetype.
//!
//! # Architecture
//!
//! - **Slot storage**: a [`SlotMap`] owns every instance, active or dormant
//! - **Dormant lists**: one LIFO stack of parked handles per archetype
//! - **Fallback construction**: an empty dormant list never blocks; a fresh
//!   instance is constructed instead
//!
//! # Usage
//!
//! ```rust
//! use tick_pool::pool::{EntityPoolManager, Poolable};
//!
//! #[derive(Default)]
//! struct Shell { fuse: f32 }
//!
//! impl Poolable for Shell {
//!     type Archetype = u8;
//!     fn archetype(&self) -> u8 { 0 }
//!     fn reset_for_reuse(&mut self) { self.fuse = 0.0; }
//!     fn end_of_life(&mut self) {}
//! }
//!
//! let mut pool = EntityPoolManager::new();
//! let first = pool.acquire_with(0, |_| Shell::default()).unwrap();
//! pool.release(first.id).unwrap();
//! let second = pool.acquire_with(0, |_| Shell::default()).unwrap();
//! assert_eq!(first.id, second.id);
//! assert!(second.recycled);
//! ```

use std::collections::HashMap;

use slotmap::SlotMap;

use super::{EntityId, Poolable};
use crate::error::PoolError;

/// Which set a pooled instance is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// In play
    Active,
    /// Parked for reuse
    Dormant,
}

#[derive(Debug)]
struct PoolSlot<T> {
    entity: T,
    state: SlotState,
}

/// Result of an acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired {
    /// Handle of the instance now active
    pub id: EntityId,
    /// `true` if a dormant instance was reused, `false` if one was constructed
    pub recycled: bool,
}

/// Statistics for monitoring pool behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances constructed because no dormant one was available
    pub constructed: u64,
    /// Acquisitions served from the dormant set
    pub recycled: u64,
    /// Instances returned to the dormant set
    pub released: u64,
    /// Instances currently active
    pub current_active: usize,
    /// Highest simultaneous active count
    pub peak_active: usize,
    /// Instances currently dormant
    pub dormant: usize,
}

/// Pool of reusable entities partitioned by archetype
#[derive(Debug)]
pub struct EntityPoolManager<T: Poolable> {
    slots: SlotMap<EntityId, PoolSlot<T>>,
    dormant: HashMap<T::Archetype, Vec<EntityId>>,
    stats: PoolStats,
    torn_down: bool,
}

impl<T: Poolable> Default for EntityPoolManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Poolable> EntityPoolManager<T> {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            dormant: HashMap::new(),
            stats: PoolStats::default(),
            torn_down: false,
        }
    }

    /// Hand out an active instance of `archetype`
    ///
    /// A dormant instance is preferred and is fully reset before it is returned.
    /// Otherwise `construct` builds a new one from its freshly minted handle.
    pub fn acquire_with<F>(&mut self, archetype: T::Archetype, construct: F) -> Result<Acquired, PoolError>
    where
        F: FnOnce(EntityId) -> T,
    {
        if self.torn_down {
            return Err(PoolError::TornDown);
        }

        while let Some(id) = self.dormant.get_mut(&archetype).and_then(Vec::pop) {
            let Some(slot) = self.slots.get_mut(id) else {
                log::warn!("Dropping stale dormant handle {id:?} for {archetype:?}");
                continue;
            };
            slot.entity.reset_for_reuse();
            slot.state = SlotState::Active;
            self.stats.recycled += 1;
            self.on_activated();
            log::trace!("Recycled {id:?} for {archetype:?}");
            return Ok(Acquired { id, recycled: true });
        }

        // Starvation is not an error; pay for an allocation instead
        let id = self.slots.insert_with_key(|id| PoolSlot {
            entity: construct(id),
            state: SlotState::Active,
        });
        self.stats.constructed += 1;
        self.on_activated();
        log::debug!("No dormant {archetype:?} available, constructed {id:?}");
        Ok(Acquired { id, recycled: false })
    }

    /// Construct `count` instances straight into the dormant set
    pub fn prewarm<F>(&mut self, count: usize, mut construct: F) -> Result<(), PoolError>
    where
        F: FnMut(EntityId) -> T,
    {
        if self.torn_down {
            return Err(PoolError::TornDown);
        }
        for _ in 0..count {
            let id = self.slots.insert_with_key(|id| PoolSlot {
                entity: construct(id),
                state: SlotState::Dormant,
            });
            let archetype = self.slots[id].entity.archetype();
            self.dormant.entry(archetype).or_default().push(id);
            self.stats.constructed += 1;
        }
        self.refresh_counts();
        log::debug!("Prewarmed {count} dormant instances ({} total)", self.slots.len());
        Ok(())
    }

    /// Park an active instance for reuse
    ///
    /// Runs the instance's end-of-life cleanup. Releasing an instance that is
    /// already dormant is refused and leaves the dormant set untouched.
    pub fn release(&mut self, id: EntityId) -> Result<(), PoolError> {
        if self.torn_down {
            return Err(PoolError::TornDown);
        }
        let slot = self.slots.get_mut(id).ok_or(PoolError::UnknownEntity(id))?;
        if slot.state == SlotState::Dormant {
            return Err(PoolError::AlreadyDormant(id));
        }

        slot.entity.end_of_life();
        slot.state = SlotState::Dormant;
        let archetype = slot.entity.archetype();
        self.dormant.entry(archetype).or_default().push(id);

        self.stats.released += 1;
        self.refresh_counts();
        log::trace!("Released {id:?} to the {archetype:?} pool");
        Ok(())
    }

    /// Destroy every active and dormant instance
    ///
    /// `destroy` receives each instance with the state it was in. The pool refuses
    /// all further use afterwards.
    pub fn teardown<F>(&mut self, mut destroy: F)
    where
        F: FnMut(EntityId, T, SlotState),
    {
        if self.torn_down {
            return;
        }
        let total = self.slots.len();
        let active = self.stats.current_active;
        for (id, slot) in self.slots.drain() {
            destroy(id, slot.entity, slot.state);
        }
        self.dormant.clear();
        self.torn_down = true;
        self.refresh_counts();
        log::info!("Pool torn down: destroyed {total} instances ({active} were active)");
    }

    /// Instance by handle, active or dormant
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.slots.get(id).map(|slot| &slot.entity)
    }

    /// Mutable instance by handle, active or dormant
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.slots.get_mut(id).map(|slot| &mut slot.entity)
    }

    /// Mutable instance by handle, only while it is active
    pub fn get_active_mut(&mut self, id: EntityId) -> Result<&mut T, PoolError> {
        match self.slots.get_mut(id) {
            Some(slot) if slot.state == SlotState::Active => Ok(&mut slot.entity),
            Some(_) => Err(PoolError::NotActive(id)),
            None => Err(PoolError::UnknownEntity(id)),
        }
    }

    /// State of an instance, `None` if the handle is unknown
    pub fn state(&self, id: EntityId) -> Option<SlotState> {
        self.slots.get(id).map(|slot| slot.state)
    }

    /// Whether the handle refers to an active instance
    pub fn is_active(&self, id: EntityId) -> bool {
        self.state(id) == Some(SlotState::Active)
    }

    /// Handles of every active instance
    pub fn active_ids(&self) -> Vec<EntityId> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.state == SlotState::Active)
            .map(|(id, _)| id)
            .collect()
    }

    /// Mutable iteration over active instances
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.slots
            .iter_mut()
            .filter(|(_, slot)| slot.state == SlotState::Active)
            .map(|(id, slot)| (id, &mut slot.entity))
    }

    /// Number of active instances
    pub fn active_count(&self) -> usize {
        self.stats.current_active
    }

    /// Number of dormant instances of one archetype
    pub fn dormant_count(&self, archetype: T::Archetype) -> usize {
        self.dormant.get(&archetype).map_or(0, Vec::len)
    }

    /// Total instances owned, active and dormant
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool owns nothing
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether [`teardown`](Self::teardown) already ran
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Current statistics
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    fn on_activated(&mut self) {
        self.refresh_counts();
        self.stats.peak_active = self.stats.peak_active.max(self.stats.current_active);
    }

    fn refresh_counts(&mut self) {
        self.stats.dormant = self.dormant.values().map(Vec::len).sum();
        self.stats.current_active = self.slots.len() - self.stats.dormant;
    }
}

impl<T: Poolable> Drop for EntityPoolManager<T> {
    fn drop(&mut self) {
        if !self.torn_down && !self.slots.is_empty() {
            self.teardown(|_, _, _| {});
        }
    }
}
