//! Managed per-frame tick dispatch
//!
//! Units that opt in are taken off the host's default per-component dispatch and
//! ticked from one explicit, insertion-ordered list per [`TickGroup`]. Removal is
//! deferred to the end of the pass so units may de-register themselves mid-frame.

pub mod group;
pub mod function;
pub mod registry;

pub use group::TickGroup;
pub use function::{DispatchPath, TickFunction, TickFunctionId};
pub use registry::{FrameStats, TickContext, TickEntry, TickRegistry, TickStatus};
