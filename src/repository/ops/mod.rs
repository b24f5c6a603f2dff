//! Store Operations Module
//!
//! Extension traits implemented for every `StoreTx`:
//! - positioning: Dense index management within a scope
//! - hierarchy: Node classification and ownership resolution
//! - lifecycle: Cascading deletes

mod positioning;
mod hierarchy;
mod lifecycle;

pub use positioning::PositioningOperations;
pub use hierarchy::{HierarchyOperations, NodeLocation};
pub use lifecycle::{DeleteReport, LifecycleOperations};
