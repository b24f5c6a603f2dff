//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod memory;
mod ops;
mod sqlite_tx;

#[cfg(test)]
mod tests;

pub use traits::{EntityStore, StoreTx};
pub use db::{init_db, SqliteStore};
pub use memory::MemoryStore;

// Re-export the operation traits so they apply to any `StoreTx`
pub use ops::{DeleteReport, HierarchyOperations, LifecycleOperations, NodeLocation, PositioningOperations};
