//! Hierarchy Operations
//!
//! Read-side resolution of the owner -> list -> item -> sub-item chain.

use serde::Serialize;

use crate::domain::{
    DomainError, DomainResult, EntityRef, ListId, NodeId, NodeKind, NodeParent, OwnerId, Placement, Scope,
};
use crate::repository::traits::StoreTx;

/// Nodes may sit at most this many levels below their list
const MAX_NODE_DEPTH: usize = 2;

/// Resolved position of a node in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeLocation {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Sibling scope the node is ordered in
    pub scope: Scope,
    pub index: i32,
    pub list_id: ListId,
    pub owner_id: OwnerId,
    /// Owning item, set for sub-items only
    pub parent_item: Option<NodeId>,
}

impl NodeLocation {
    pub fn placement(&self) -> Placement {
        Placement {
            scope: self.scope,
            index: self.index,
        }
    }
}

fn not_found(entity: EntityRef) -> DomainError {
    DomainError::NotFound(entity.to_string())
}

/// Trait for hierarchy resolution
pub trait HierarchyOperations: StoreTx {
    /// Classify a node and walk up to its list and owner
    fn locate(&self, id: NodeId) -> DomainResult<NodeLocation> {
        let node = self.find_node(id)?.ok_or_else(|| not_found(EntityRef::Node(id)))?;

        let mut depth = 1;
        let mut parent = node.parent;
        let list_id = loop {
            match parent {
                NodeParent::List(list_id) => break list_id,
                NodeParent::Item(parent_id) => {
                    depth += 1;
                    if depth > MAX_NODE_DEPTH {
                        return Err(DomainError::Internal(format!(
                            "node {} is nested deeper than {} levels",
                            id, MAX_NODE_DEPTH
                        )));
                    }
                    parent = self
                        .find_node(parent_id)?
                        .ok_or_else(|| DomainError::Internal(format!("node {} has a dangling parent {}", id, parent_id)))?
                        .parent;
                }
            }
        };

        let list = self
            .find_list(list_id)?
            .ok_or_else(|| DomainError::Internal(format!("node {} has a dangling list {}", id, list_id)))?;

        Ok(NodeLocation {
            id,
            kind: node.kind(),
            scope: node.scope(),
            index: node.index,
            list_id,
            owner_id: list.owner_id,
            parent_item: node.parent_node_id(),
        })
    }

    /// Location of node `id`, provided `actor` owns it
    fn locate_owned(&self, actor: OwnerId, id: NodeId) -> DomainResult<NodeLocation> {
        let location = match self.locate(id) {
            Ok(location) => location,
            Err(DomainError::NotFound(_)) => return Err(not_found(EntityRef::Node(id))),
            Err(err) => return Err(err),
        };
        if location.owner_id != actor {
            return Err(not_found(EntityRef::Node(id)));
        }
        Ok(location)
    }

    /// Placement of `entity`, provided `actor` owns it
    ///
    /// Missing and foreign entities both fail with `NotFound`.
    fn authorize(&self, actor: OwnerId, entity: EntityRef) -> DomainResult<Placement> {
        match entity {
            EntityRef::List(id) => {
                let list = self
                    .find_list(id)?
                    .filter(|list| list.owner_id == actor)
                    .ok_or_else(|| not_found(entity))?;
                Ok(Placement {
                    scope: list.scope(),
                    index: list.index,
                })
            }
            EntityRef::Node(id) => Ok(self.locate_owned(actor, id)?.placement()),
        }
    }

    /// Check that `actor` may add nodes under `parent`
    ///
    /// Only owned lists and owned top-level items accept children.
    fn authorize_parent(&self, actor: OwnerId, parent: NodeParent) -> DomainResult<()> {
        match parent {
            NodeParent::List(id) => self.authorize(actor, EntityRef::List(id)).map(|_| ()),
            NodeParent::Item(id) => {
                if !self.locate_owned(actor, id)?.kind.can_own_children() {
                    return Err(not_found(EntityRef::Node(id)));
                }
                Ok(())
            }
        }
    }

    /// Check that `actor` may read `scope`
    fn authorize_scope(&self, actor: OwnerId, scope: Scope) -> DomainResult<()> {
        match scope {
            Scope::Owner(owner) if owner == actor => Ok(()),
            Scope::Owner(owner) => Err(DomainError::NotFound(format!("owner {}", owner))),
            Scope::List(id) => self.authorize_parent(actor, NodeParent::List(id)),
            Scope::Item(id) => self.authorize_parent(actor, NodeParent::Item(id)),
        }
    }

    /// Scope holding the children of `entity`, `None` for leaf levels
    fn child_scope(&self, entity: EntityRef) -> DomainResult<Option<Scope>> {
        match entity {
            EntityRef::List(id) => Ok(Some(Scope::List(id))),
            EntityRef::Node(id) => {
                let node = self.find_node(id)?.ok_or_else(|| not_found(entity))?;
                Ok(node.kind().can_own_children().then_some(Scope::Item(id)))
            }
        }
    }

    /// Direct children of `entity` ordered by index
    fn children(&self, entity: EntityRef) -> DomainResult<Vec<EntityRef>> {
        let Some(scope) = self.child_scope(entity)? else {
            return Ok(Vec::new());
        };
        Ok(self
            .members(scope, 0..=i32::MAX)?
            .into_iter()
            .map(|member| EntityRef::Node(member.id))
            .collect())
    }
}

impl<T: StoreTx + ?Sized> HierarchyOperations for T {}
