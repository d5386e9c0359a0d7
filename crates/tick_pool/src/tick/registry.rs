//! Managed Tick Registry
//!
//! Executes every registered unit once per frame, in insertion order, for a
//! single [`TickGroup`]. De-registration is buffered in a cleanup queue and only
//! materialized after the pass, so a unit queued for removal (before or during
//! the frame) still runs once more in the next pass and then disappears.
//!
//! # Usage
//!
//! ```rust
//! use tick_pool::tick::{TickGroup, TickRegistry, TickStatus};
//! use tick_pool::pool::EntityId;
//!
//! let mut registry = TickRegistry::new(TickGroup::PrePhysics);
//! let mut unit = registry.create_tick_function(EntityId::default());
//! registry.register(&mut unit).unwrap();
//!
//! let stats = registry.execute_frame(0.016, |entry, ctx| {
//!     // Units may remove themselves while the pass is running
//!     ctx.deregister(entry.id)?;
//!     Ok(TickStatus::Ticked)
//! });
//! assert_eq!(stats.ticked, 1);
//! assert_eq!(stats.removed, 1);
//! ```

use std::collections::HashSet;

use super::{TickFunction, TickFunctionId, TickGroup};
use crate::error::TickError;
use crate::pool::EntityId;

/// One scheduled unit as seen by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEntry {
    /// Unit identifier
    pub id: TickFunctionId,
    /// Owning entity (back-reference, not ownership)
    pub owner: EntityId,
}

/// What a unit did when it was dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// The update ran
    Ticked,
    /// The unit is registered but disabled
    Skipped,
}

/// Counters for one executed pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Units whose update ran
    pub ticked: usize,
    /// Disabled units that were passed over
    pub skipped: usize,
    /// Units whose update returned an error
    pub failed: usize,
    /// Units dropped by the post-pass cleanup
    pub removed: usize,
    /// Units registered mid-pass that joined after it
    pub added: usize,
}

/// Registration access handed to units while a pass is running
///
/// Everything requested here is applied after the pass completes.
pub struct TickContext<'a> {
    delta_time: f32,
    group: TickGroup,
    frame: u64,
    members: &'a HashSet<TickFunctionId>,
    cleanup_queue: &'a mut HashSet<TickFunctionId>,
    pending: &'a mut Vec<TickEntry>,
}

impl TickContext<'_> {
    /// Seconds covered by this frame
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Group being executed
    pub fn group(&self) -> TickGroup {
        self.group
    }

    /// Index of the frame being executed
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Queue a unit for removal after this pass
    ///
    /// Accepts units in the active set and units registered earlier in this
    /// pass; anything else is [`TickError::NotRegistered`].
    pub fn deregister(&mut self, id: TickFunctionId) -> Result<(), TickError> {
        if !self.members.contains(&id) && !self.pending.iter().any(|entry| entry.id == id) {
            return Err(TickError::NotRegistered(id));
        }
        self.cleanup_queue.insert(id);
        Ok(())
    }

    /// Register a unit; it starts ticking from the next frame
    pub fn register(&mut self, function: &mut TickFunction) -> Result<(), TickError> {
        check_group(function, self.group)?;
        function.remove_from_default_path();

        let id = function.id();
        if self.members.contains(&id) {
            if self.cleanup_queue.remove(&id) {
                return Ok(());
            }
            return Err(TickError::AlreadyRegistered(id));
        }
        if self.pending.iter().any(|entry| entry.id == id) {
            return Err(TickError::AlreadyRegistered(id));
        }

        self.pending.push(TickEntry { id, owner: function.owner() });
        Ok(())
    }
}

/// Ordered registry of managed tick functions for one group
#[derive(Debug)]
pub struct TickRegistry {
    group: TickGroup,
    units: Vec<TickEntry>,
    members: HashSet<TickFunctionId>,
    cleanup_queue: HashSet<TickFunctionId>,
    pending: Vec<TickEntry>,
    next_id: u64,
    frames_executed: u64,
    last_frame: FrameStats,
}

impl TickRegistry {
    /// Create an empty registry that runs in `group`
    pub fn new(group: TickGroup) -> Self {
        Self {
            group,
            units: Vec::new(),
            members: HashSet::new(),
            cleanup_queue: HashSet::new(),
            pending: Vec::new(),
            next_id: 0,
            frames_executed: 0,
            last_frame: FrameStats::default(),
        }
    }

    /// Group this registry executes in
    pub fn group(&self) -> TickGroup {
        self.group
    }

    /// Mint a tick function for a unit owned by `owner`, tagged with this group
    pub fn create_tick_function(&mut self, owner: EntityId) -> TickFunction {
        let id = TickFunctionId(self.next_id);
        self.next_id += 1;
        TickFunction::new(id, owner, self.group)
    }

    /// Move a unit from the default dispatch path into this registry
    ///
    /// Registering a unit whose removal is still queued cancels the removal, which
    /// is what happens when a pooled entity is released and re-acquired within one
    /// frame. Registering a unit that is already present otherwise fails.
    pub fn register(&mut self, function: &mut TickFunction) -> Result<(), TickError> {
        check_group(function, self.group)?;
        // Never ticked twice: leave the default path before joining this one
        function.remove_from_default_path();

        let id = function.id();
        if self.members.contains(&id) {
            if self.cleanup_queue.remove(&id) {
                log::trace!("Re-registered {id:?}; pending removal cancelled");
                return Ok(());
            }
            return Err(TickError::AlreadyRegistered(id));
        }

        self.members.insert(id);
        self.units.push(TickEntry { id, owner: function.owner() });
        log::trace!("Registered {id:?} in {:?} ({} units)", self.group, self.units.len());
        Ok(())
    }

    /// Queue a unit for removal at the end of the next pass
    ///
    /// Never removes immediately, so it is safe at any point of the frame.
    pub fn deregister(&mut self, id: TickFunctionId) -> Result<(), TickError> {
        if !self.members.contains(&id) {
            return Err(TickError::NotRegistered(id));
        }
        self.cleanup_queue.insert(id);
        Ok(())
    }

    /// Run every registered unit once, then apply queued changes
    ///
    /// `dispatch` is invoked for each entry in insertion order. A unit returning an
    /// error is logged and counted; the remaining units still run.
    pub fn execute_frame<F>(&mut self, delta_time: f32, mut dispatch: F) -> FrameStats
    where
        F: FnMut(&TickEntry, &mut TickContext<'_>) -> Result<TickStatus, TickError>,
    {
        let mut stats = FrameStats::default();
        let frame = self.frames_executed;

        {
            let mut ctx = TickContext {
                delta_time,
                group: self.group,
                frame,
                members: &self.members,
                cleanup_queue: &mut self.cleanup_queue,
                pending: &mut self.pending,
            };

            for entry in &self.units {
                match dispatch(entry, &mut ctx) {
                    Ok(TickStatus::Ticked) => stats.ticked += 1,
                    Ok(TickStatus::Skipped) => stats.skipped += 1,
                    Err(err) => {
                        stats.failed += 1;
                        log::error!("Tick of {:?} in {:?} failed: {err}", entry.id, self.group);
                    }
                }
            }
        }

        // Mid-pass registrations join first so a same-frame deregister still applies
        stats.added = self.pending.len();
        for entry in self.pending.drain(..) {
            if self.members.insert(entry.id) {
                self.units.push(entry);
            }
        }

        // Cleanup after ticking all units
        if !self.cleanup_queue.is_empty() {
            let before = self.units.len();
            for id in &self.cleanup_queue {
                self.members.remove(id);
            }
            let members = &self.members;
            self.units.retain(|entry| members.contains(&entry.id));
            stats.removed = before - self.units.len();
            self.cleanup_queue.clear();
        }

        self.frames_executed += 1;
        self.last_frame = stats;
        log::trace!("{:?} frame {frame}: {stats:?}", self.group);
        stats
    }

    /// Whether the unit is in the active set (possibly with a removal queued)
    pub fn is_registered(&self, id: TickFunctionId) -> bool {
        self.members.contains(&id)
    }

    /// Whether the unit is waiting for the post-pass cleanup
    pub fn is_pending_removal(&self, id: TickFunctionId) -> bool {
        self.cleanup_queue.contains(&id)
    }

    /// Units in execution order
    pub fn entries(&self) -> &[TickEntry] {
        &self.units
    }

    /// Number of units in the active set
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether no unit is registered
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of removals waiting for the end of the next pass
    pub fn pending_removals(&self) -> usize {
        self.cleanup_queue.len()
    }

    /// Frames executed so far
    pub fn frames_executed(&self) -> u64 {
        self.frames_executed
    }

    /// Counters of the most recent pass
    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }
}

fn check_group(function: &TickFunction, group: TickGroup) -> Result<(), TickError> {
    if function.group() == group {
        Ok(())
    } else {
        Err(TickError::GroupMismatch {
            id: function.id(),
            unit: function.group(),
            registry: group,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::tick::DispatchPath;

    fn registry_with(count: usize) -> (TickRegistry, Vec<TickFunction>) {
        let mut registry = TickRegistry::new(TickGroup::PrePhysics);
        let mut units: Vec<_> = (0..count)
            .map(|_| registry.create_tick_function(EntityId::default()))
            .collect();
        for unit in &mut units {
            registry.register(unit).unwrap();
        }
        (registry, units)
    }

    fn run(registry: &mut TickRegistry) -> Vec<TickFunctionId> {
        let mut ticked = Vec::new();
        registry.execute_frame(0.1, |entry, _| {
            ticked.push(entry.id);
            Ok(TickStatus::Ticked)
        });
        ticked
    }

    #[test]
    fn test_executes_in_insertion_order() {
        let (mut registry, units) = registry_with(3);
        let ticked = run(&mut registry);
        let expected: Vec<_> = units.iter().map(TickFunction::id).collect();
        assert_eq!(ticked, expected);
    }

    #[test]
    fn test_register_leaves_default_path() {
        let mut registry = TickRegistry::new(TickGroup::PrePhysics);
        let mut unit = registry.create_tick_function(EntityId::default());
        assert_eq!(unit.path(), DispatchPath::Default);

        registry.register(&mut unit).unwrap();
        assert_eq!(unit.path(), DispatchPath::Managed);
        assert!(!unit.on_default_path());
    }

    #[test]
    fn test_double_register_is_rejected() {
        let (mut registry, mut units) = registry_with(1);
        let err = registry.register(&mut units[0]).unwrap_err();
        assert_eq!(err, TickError::AlreadyRegistered(units[0].id()));
        assert_eq!(registry.len(), 1);
        assert_eq!(run(&mut registry).len(), 1);
    }

    #[test]
    fn test_group_mismatch_is_rejected() {
        let mut pre = TickRegistry::new(TickGroup::PrePhysics);
        let mut post = TickRegistry::new(TickGroup::PostPhysics);
        let mut unit = pre.create_tick_function(EntityId::default());
        assert!(matches!(
            post.register(&mut unit),
            Err(TickError::GroupMismatch { .. })
        ));
        assert!(post.is_empty());
    }

    #[test]
    fn test_deregister_runs_once_more_then_stops() {
        let (mut registry, units) = registry_with(2);
        registry.deregister(units[0].id()).unwrap();
        assert!(registry.is_registered(units[0].id()));
        assert!(registry.is_pending_removal(units[0].id()));

        assert_eq!(run(&mut registry).len(), 2);
        assert!(!registry.is_registered(units[0].id()));
        assert_eq!(run(&mut registry), vec![units[1].id()]);
    }

    #[test]
    fn test_self_deregister_during_pass() {
        let (mut registry, units) = registry_with(3);
        let victim = units[1].id();

        let mut ticked = Vec::new();
        let stats = registry.execute_frame(0.1, |entry, ctx| {
            ticked.push(entry.id);
            if entry.id == victim {
                ctx.deregister(entry.id)?;
            }
            Ok(TickStatus::Ticked)
        });

        // Nothing is skipped mid-iteration
        assert_eq!(ticked.len(), 3);
        assert_eq!(stats.removed, 1);
        assert_eq!(run(&mut registry), vec![units[0].id(), units[2].id()]);
    }

    #[test]
    fn test_deregister_unknown_unit() {
        let mut registry = TickRegistry::new(TickGroup::PrePhysics);
        let unit = registry.create_tick_function(EntityId::default());
        assert_eq!(
            registry.deregister(unit.id()),
            Err(TickError::NotRegistered(unit.id()))
        );
    }

    #[test]
    fn test_mid_pass_deregister_of_unknown_unit_is_refused() {
        let (mut registry, _units) = registry_with(1);
        let stranger = registry.create_tick_function(EntityId::default()).id();

        let mut refused = None;
        registry.execute_frame(0.1, |_, ctx| {
            refused = Some(ctx.deregister(stranger));
            Ok(TickStatus::Ticked)
        });
        assert_eq!(refused, Some(Err(TickError::NotRegistered(stranger))));
        assert_eq!(registry.pending_removals(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_mid_pass_registration_can_be_withdrawn_in_same_pass() {
        let (mut registry, _units) = registry_with(1);
        let mut late = registry.create_tick_function(EntityId::default());
        let late_id = late.id();

        let stats = registry.execute_frame(0.1, |_, ctx| {
            ctx.register(&mut late)?;
            ctx.deregister(late_id)?;
            Ok(TickStatus::Ticked)
        });
        assert_eq!(stats.added, 1);
        assert_eq!(stats.removed, 1);
        assert!(!registry.is_registered(late_id));
    }

    #[test]
    fn test_burst_of_removals_is_applied_at_once() {
        let (mut registry, units) = registry_with(500);
        for unit in units.iter().step_by(2) {
            registry.deregister(unit.id()).unwrap();
            registry.deregister(unit.id()).unwrap();
        }
        assert_eq!(registry.pending_removals(), 250);

        let stats = registry.execute_frame(0.1, |_, _| Ok(TickStatus::Ticked));
        assert_eq!(stats.ticked, 500);
        assert_eq!(stats.removed, 250);
        let survivors: Vec<_> = units.iter().skip(1).step_by(2).map(TickFunction::id).collect();
        assert_eq!(entry_ids(&registry), survivors);
    }

    #[test]
    fn test_duplicate_deregister_queues_once() {
        let (mut registry, units) = registry_with(1);
        registry.deregister(units[0].id()).unwrap();
        registry.deregister(units[0].id()).unwrap();
        assert_eq!(registry.pending_removals(), 1);
    }

    #[test]
    fn test_reregister_cancels_pending_removal() {
        let (mut registry, mut units) = registry_with(1);
        registry.deregister(units[0].id()).unwrap();
        registry.register(&mut units[0]).unwrap();

        assert_eq!(registry.pending_removals(), 0);
        run(&mut registry);
        assert_eq!(run(&mut registry).len(), 1);
    }

    #[test]
    fn test_mid_pass_registration_starts_next_frame() {
        let (mut registry, _units) = registry_with(1);
        let mut late = registry.create_tick_function(EntityId::default());
        let late_id = late.id();

        let mut ticked = Vec::new();
        let stats = registry.execute_frame(0.1, |entry, ctx| {
            ticked.push(entry.id);
            ctx.register(&mut late)?;
            Ok(TickStatus::Ticked)
        });
        assert!(!ticked.contains(&late_id));
        assert_eq!(stats.added, 1);
        assert!(registry.is_registered(late_id));
        assert!(run(&mut registry).contains(&late_id));
    }

    #[test]
    fn test_failing_unit_does_not_abort_frame() {
        let (mut registry, units) = registry_with(3);
        let bad = units[0].id();

        let mut ticked = Vec::new();
        let stats = registry.execute_frame(0.1, |entry, _| {
            if entry.id == bad {
                return Err(TickError::UnitFailed { id: entry.id, reason: "boom".into() });
            }
            ticked.push(entry.id);
            Ok(TickStatus::Ticked)
        });
        assert_eq!(stats.failed, 1);
        assert_eq!(ticked, vec![units[1].id(), units[2].id()]);
    }

    #[test]
    fn test_skipped_units_are_counted() {
        let (mut registry, _units) = registry_with(2);
        let stats = registry.execute_frame(0.1, |_, _| Ok(TickStatus::Skipped));
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.ticked, 0);
        assert_eq!(registry.last_frame(), stats);
        assert_eq!(registry.frames_executed(), 1);
    }

    #[test]
    fn test_interleaved_operations_never_double_tick() {
        let (mut registry, mut units) = registry_with(4);
        for round in 0..6 {
            let target = round % units.len();
            if registry.is_registered(units[target].id()) {
                registry.deregister(units[target].id()).unwrap();
            } else {
                registry.register(&mut units[target]).unwrap();
            }

            let ticked = run(&mut registry);
            let unique: HashSet<_> = ticked.iter().copied().collect();
            assert_eq!(unique.len(), ticked.len());
            // Anything removed at the last boundary must be gone now
            for unit in &units {
                if !registry.is_registered(unit.id()) {
                    assert!(!entry_ids(&registry).contains(&unit.id()));
                }
            }
        }
    }

    fn entry_ids(registry: &TickRegistry) -> Vec<TickFunctionId> {
        registry.entries().iter().map(|entry| entry.id).collect()
    }
}
