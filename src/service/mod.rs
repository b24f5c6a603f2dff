//! Service Layer
//!
//! Async entry points used by the host. Each call validates its input and
//! then runs as a single store transaction: authorization, positioning and
//! cascades either all apply or none do.

mod ids;


pub use ids::{IdAllocator, IdSource, RandomIds};

use chrono::Utc;

use crate::config::{CoreConfig, Limits};
use crate::domain::{
    parse_due_time, validate_name, DomainError, DomainResult, EntityRef, ListDraft, ListEdit, ListId, Member, Node,
    NodeDraft, NodeEdit, NodeId, NodeParent, OwnerId, Scope, TodoList,
};
use crate::repository::{
    init_db, DeleteReport, EntityStore, HierarchyOperations, LifecycleOperations, NodeLocation,
    PositioningOperations, SqliteStore,
};

/// Todo operations on behalf of an acting owner
pub struct TodoService<S: EntityStore> {
    store: S,
    ids: IdAllocator,
    limits: Limits,
}

impl TodoService<SqliteStore> {
    /// Open the SQLite store named in `config`
    pub fn open(config: &CoreConfig) -> DomainResult<Self> {
        let store = init_db(&config.database.path)?;
        Ok(Self::new(store, config))
    }
}

impl<S: EntityStore> TodoService<S> {
    pub fn new(store: S, config: &CoreConfig) -> Self {
        Self::with_allocator(store, IdAllocator::random(config.ids.max_attempts), config.limits.clone())
    }

    pub fn with_allocator(store: S, ids: IdAllocator, limits: Limits) -> Self {
        Self { store, ids, limits }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append a new list to the actor's lists
    pub async fn create_list(&self, actor: OwnerId, draft: ListDraft) -> DomainResult<TodoList> {
        validate_name(&draft.name, self.limits.name_max_len)?;
        let ids = &self.ids;

        let list = self
            .store
            .transaction(move |tx| {
                let id = ids.allocate(|id| tx.exists(EntityRef::List(id)))?;
                let index = tx.next_index(Scope::Owner(actor))?;
                let list = TodoList::new(id, actor, draft.name, draft.comment, index);
                tx.insert_list(&list)?;
                Ok(list)
            })
            .await?;

        log::info!("Created list {} for owner {} at {}", list.id, actor, list.index);
        Ok(list)
    }

    /// Append a new item to a list, or a new sub-item to an item
    pub async fn create_node(&self, actor: OwnerId, parent: NodeParent, draft: NodeDraft) -> DomainResult<Node> {
        validate_name(&draft.name, self.limits.name_max_len)?;
        let ids = &self.ids;

        let node = self
            .store
            .transaction(move |tx| {
                tx.authorize_parent(actor, parent)?;
                let id = ids.allocate(|id| tx.exists(EntityRef::Node(id)))?;
                let index = tx.next_index(parent.into())?;
                let node = Node::new(id, parent, draft.name, draft.comment, index);
                tx.insert_node(&node)?;
                Ok(node)
            })
            .await?;

        log::info!("Created {} {} at {} of {}", node.kind().as_str(), node.id, node.index, node.scope());
        Ok(node)
    }

    /// Move an entity to `target` within its own scope
    pub async fn move_entity(&self, actor: OwnerId, entity: EntityRef, target: i32) -> DomainResult<()> {
        let from = self
            .store
            .transaction(move |tx| {
                let placement = tx.authorize(actor, entity)?;
                tx.move_member(placement.scope, entity.raw_id(), placement.index, target)?;
                Ok(placement.index)
            })
            .await?;

        log::info!("Moved {} from {} to {}", entity, from, target);
        Ok(())
    }

    /// Delete an entity together with everything below it
    pub async fn delete_entity(&self, actor: OwnerId, entity: EntityRef) -> DomainResult<DeleteReport> {
        let report = self
            .store
            .transaction(move |tx| {
                tx.authorize(actor, entity)?;
                tx.delete_cascade(entity)
            })
            .await?;

        log::info!("Deleted {} ({} rows)", entity, report.total());
        Ok(report)
    }

    /// Delete every list of the actor with all of their content
    pub async fn delete_owner(&self, actor: OwnerId) -> DomainResult<DeleteReport> {
        let report = self
            .store
            .transaction(move |tx| tx.delete_owner_lists(actor))
            .await?;

        log::info!("Deleted all lists of owner {} ({} rows)", actor, report.total());
        Ok(report)
    }

    /// Ids and indices of a scope, ascending by index
    pub async fn list_siblings(&self, actor: OwnerId, scope: Scope) -> DomainResult<Vec<Member>> {
        self.store
            .transaction(move |tx| {
                tx.authorize_scope(actor, scope)?;
                tx.members(scope, 0..=i32::MAX)
            })
            .await
    }

    pub async fn lists(&self, actor: OwnerId) -> DomainResult<Vec<TodoList>> {
        self.store.transaction(move |tx| tx.lists_of(actor)).await
    }

    /// Items of a list or sub-items of an item, ordered by index
    pub async fn nodes(&self, actor: OwnerId, parent: NodeParent) -> DomainResult<Vec<Node>> {
        self.store
            .transaction(move |tx| {
                tx.authorize_parent(actor, parent)?;
                tx.nodes_under(parent)
            })
            .await
    }

    pub async fn locate(&self, actor: OwnerId, id: NodeId) -> DomainResult<NodeLocation> {
        self.store.transaction(move |tx| tx.locate_owned(actor, id)).await
    }

    /// Replace the fields of a list, moving it when `edit.index` differs
    pub async fn edit_list(&self, actor: OwnerId, id: ListId, edit: ListEdit) -> DomainResult<TodoList> {
        validate_name(&edit.name, self.limits.name_max_len)?;

        let list = self
            .store
            .transaction(move |tx| {
                let entity = EntityRef::List(id);
                let placement = tx.authorize(actor, entity)?;
                let mut list = tx
                    .find_list(id)?
                    .ok_or_else(|| DomainError::NotFound(entity.to_string()))?;

                list.name = edit.name;
                list.comment = edit.comment;
                tx.update_list(&list)?;

                if edit.index != placement.index {
                    tx.move_member(placement.scope, id, placement.index, edit.index)?;
                    list.index = edit.index;
                }
                Ok(list)
            })
            .await?;

        log::info!("Edited list {}", list.id);
        Ok(list)
    }

    /// Replace the fields of a node, moving it when `edit.index` differs
    pub async fn edit_node(&self, actor: OwnerId, id: NodeId, edit: NodeEdit) -> DomainResult<Node> {
        validate_name(&edit.name, self.limits.name_max_len)?;
        let due_time = parse_due_time(edit.due_time.as_deref(), &self.limits.due_time_format, Utc::now())?;

        let node = self
            .store
            .transaction(move |tx| {
                let location = tx.locate_owned(actor, id)?;
                let mut node = tx
                    .find_node(id)?
                    .ok_or_else(|| DomainError::NotFound(EntityRef::Node(id).to_string()))?;

                node.name = edit.name;
                node.comment = edit.comment;
                node.categories = edit.categories;
                node.due_time = due_time;
                node.done = edit.done;
                node.special = edit.special;
                tx.update_node(&node)?;

                if edit.index != location.index {
                    tx.move_member(location.scope, id, location.index, edit.index)?;
                    node.index = edit.index;
                }
                Ok(node)
            })
            .await?;

        log::info!("Edited {} {}", node.kind().as_str(), node.id);
        Ok(node)
    }
}
