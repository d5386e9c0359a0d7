//! Error types for the tick registry, the entity pool and the simulation host

use crate::pool::EntityId;
use crate::projectile::ArchetypeId;
use crate::tick::{TickFunctionId, TickGroup};
use serde::{Deserialize, Serialize};

/// Errors raised by the managed tick registry
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TickError {
    /// Unit is already in the active set and has no pending removal
    #[error("tick function {0:?} is already registered")]
    AlreadyRegistered(TickFunctionId),

    /// Unit was never registered (or was already removed)
    #[error("tick function {0:?} is not registered")]
    NotRegistered(TickFunctionId),

    /// Unit is tagged for a different tick group than the registry runs
    #[error("tick function {id:?} belongs to {unit:?}, registry runs {registry:?}")]
    GroupMismatch {
        /// Offending unit
        id: TickFunctionId,
        /// Group the unit is tagged with
        unit: TickGroup,
        /// Group of the registry
        registry: TickGroup,
    },

    /// A unit's update failed; the rest of the frame still ran
    #[error("tick function {id:?} failed: {reason}")]
    UnitFailed {
        /// Failing unit
        id: TickFunctionId,
        /// What went wrong
        reason: String,
    },
}

/// Errors raised by the entity pool manager
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Handle does not refer to a live pooled instance
    #[error("entity {0:?} is not owned by this pool")]
    UnknownEntity(EntityId),

    /// Entity is already parked in the dormant set
    #[error("entity {0:?} is already dormant")]
    AlreadyDormant(EntityId),

    /// Operation requires an active entity
    #[error("entity {0:?} is not active")]
    NotActive(EntityId),

    /// Pool was torn down and owns nothing anymore
    #[error("pool has been torn down")]
    TornDown,
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Top-level error for the simulation host
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    /// Tick registry error
    #[error(transparent)]
    Tick(#[from] TickError),

    /// Pool error
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No descriptor registered for the archetype
    #[error("unknown projectile archetype {0:?}")]
    UnknownArchetype(ArchetypeId),
}

/// Result alias used by the simulation host
pub type SimResult<T> = Result<T, SimError>;

/// How an invariant violation (double registration, double release) is surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvariantPolicy {
    /// Abort loudly; the default in debug builds
    Panic,
    /// Log a warning and ignore the offending request; the default in release builds
    Warn,
}

impl Default for InvariantPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Panic
        } else {
            Self::Warn
        }
    }
}

impl InvariantPolicy {
    /// Surface a violation according to the policy
    ///
    /// Returns normally only under [`InvariantPolicy::Warn`].
    pub fn report(self, context: &str, error: &dyn std::error::Error) {
        match self {
            Self::Panic => panic!("invariant violation in {context}: {error}"),
            Self::Warn => log::warn!("Ignoring invariant violation in {context}: {error}"),
        }
    }

    /// Pass `Ok` through, report an `Err` and swallow it
    pub fn check<T, E: std::error::Error>(self, context: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.report(context, &error);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_policy_swallows_error() {
        let result: Result<u32, PoolError> = Err(PoolError::TornDown);
        assert_eq!(InvariantPolicy::Warn.check("test", result), None);
        assert_eq!(InvariantPolicy::Warn.check("test", Ok::<_, PoolError>(3)), Some(3));
    }

    #[test]
    #[should_panic(expected = "invariant violation")]
    fn test_panic_policy_panics() {
        InvariantPolicy::Panic.report("test", &PoolError::TornDown);
    }
}
