//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;
use std::ops::RangeInclusive;

use crate::domain::{DomainResult, EntityRef, ListId, Member, Node, NodeId, NodeParent, OwnerId, Scope, TodoList};

/// Operations available inside one unit of work
///
/// Every call made through a single `StoreTx` belongs to the same
/// transaction. Reads observe the writes made earlier in it.
pub trait StoreTx {
    /// Whether a row with this id exists
    fn exists(&self, entity: EntityRef) -> DomainResult<bool>;

    fn find_list(&self, id: ListId) -> DomainResult<Option<TodoList>>;

    fn find_node(&self, id: NodeId) -> DomainResult<Option<Node>>;

    /// Lists of an owner ordered by index
    fn lists_of(&self, owner_id: OwnerId) -> DomainResult<Vec<TodoList>>;

    /// Nodes under a parent ordered by index
    fn nodes_under(&self, parent: NodeParent) -> DomainResult<Vec<Node>>;

    /// Members of a scope whose index falls in `range`, ordered by index
    fn members(&self, scope: Scope, range: RangeInclusive<i32>) -> DomainResult<Vec<Member>>;

    /// Highest index in a scope, `None` when the scope is empty
    fn max_index(&self, scope: Scope) -> DomainResult<Option<i32>>;

    fn insert_list(&mut self, list: &TodoList) -> DomainResult<()>;

    fn insert_node(&mut self, node: &Node) -> DomainResult<()>;

    /// Overwrite name and comment, index and owner are left alone
    fn update_list(&mut self, list: &TodoList) -> DomainResult<()>;

    /// Overwrite the editable node fields, index and parent are left alone
    fn update_node(&mut self, node: &Node) -> DomainResult<()>;

    /// Set the index of the member `id` of `scope`
    fn set_index(&mut self, scope: Scope, id: u32, index: i32) -> DomainResult<()>;

    /// Remove a single row. Children must already be gone.
    fn remove(&mut self, entity: EntityRef) -> DomainResult<()>;
}

/// Transactional store handle shared by the service
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Run `work` as one transaction
    ///
    /// The transaction commits when `work` returns `Ok` and is rolled back
    /// entirely when it returns `Err`.
    async fn transaction<F, R>(&self, work: F) -> DomainResult<R>
    where
        F: FnOnce(&mut dyn StoreTx) -> DomainResult<R> + Send,
        R: Send;
}
