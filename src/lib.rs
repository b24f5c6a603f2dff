//! Todo Hierarchy Core
//!
//! Owners hold ordered lists, lists hold ordered items, items hold ordered
//! sub-items. Every sibling group keeps dense indices through creates,
//! moves and cascading deletes.
//!
//! Layered architecture:
//! - domain: Core entities and validation rules
//! - repository: Store abstractions, SQLite and in-memory implementations,
//!   positioning, hierarchy and lifecycle operations
//! - service: Transactional entry points and id allocation
//! - config: TOML runtime configuration

pub mod config;
pub mod domain;
pub mod repository;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use domain::{DomainError, DomainResult, EntityRef, NodeParent, Scope};
pub use repository::{init_db, DeleteReport, EntityStore, MemoryStore, NodeLocation, SqliteStore};
pub use service::TodoService;
