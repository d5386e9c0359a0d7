//! Per-unit tick function handle

use super::TickGroup;
use crate::pool::EntityId;

/// Identifier of one tickable unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickFunctionId(pub u64);

/// Which dispatcher currently owns a unit's per-frame update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPath {
    /// The host's implicit per-component dispatch
    Default,
    /// A [`TickRegistry`](super::TickRegistry)
    Managed,
}

/// Tick function owned by a tickable unit
///
/// Holds the scheduling attributes of the unit. The owner is a back-reference
/// only; the registry never owns the unit.
#[derive(Debug, Clone)]
pub struct TickFunction {
    id: TickFunctionId,
    owner: EntityId,
    group: TickGroup,
    enabled: bool,
    path: DispatchPath,
}

impl TickFunction {
    /// Create a tick function that starts on the default dispatch path
    pub fn new(id: TickFunctionId, owner: EntityId, group: TickGroup) -> Self {
        Self {
            id,
            owner,
            group,
            enabled: true,
            path: DispatchPath::Default,
        }
    }

    /// Unit identifier
    pub fn id(&self) -> TickFunctionId {
        self.id
    }

    /// Owning entity
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Tick group tag
    pub fn group(&self) -> TickGroup {
        self.group
    }

    /// Whether the unit wants updates
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable updates without touching registration
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Current dispatcher
    pub fn path(&self) -> DispatchPath {
        self.path
    }

    /// Whether the host's default dispatch should tick this unit
    pub fn on_default_path(&self) -> bool {
        self.path == DispatchPath::Default
    }

    /// Take the unit off the default dispatch path
    pub(crate) fn remove_from_default_path(&mut self) {
        self.path = DispatchPath::Managed;
    }

    /// Hand the unit back to the default dispatch path
    ///
    /// The host re-adds component ticks whenever an entity is spawned, pooled or not.
    pub fn restore_default_path(&mut self) {
        self.path = DispatchPath::Default;
        self.enabled = true;
    }
}
