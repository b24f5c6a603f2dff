//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! Nothing here touches the store.

mod entity;
mod list;
mod node;
mod scope;
mod validation;

pub use entity::{DomainError, DomainResult, Entity};
pub use list::{ListDraft, ListEdit, TodoList};
pub use node::{Node, NodeDraft, NodeEdit, NodeKind};
pub use scope::{EntityRef, ListId, Member, NodeId, NodeParent, OwnerId, Placement, Scope};
pub use validation::{parse_due_time, validate_name};
