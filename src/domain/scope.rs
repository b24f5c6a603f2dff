//! Sibling Scopes
//!
//! A scope is the set of entities sharing one immediate parent. Every
//! scope carries its own dense `0..count-1` index range.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::Entity;

pub type OwnerId = u32;
pub type ListId = u32;
pub type NodeId = u32;

/// Parent reference of a node. `List` makes it an item, `Item` a sub-item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum NodeParent {
    List(ListId),
    Item(NodeId),
}

/// Key of an ordered sibling group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Scope {
    /// Lists of one owner
    Owner(OwnerId),
    /// Items of one list
    List(ListId),
    /// Sub-items of one item
    Item(NodeId),
}

impl Scope {
    /// Parent reference shared by the nodes of this scope
    pub fn node_parent(&self) -> Option<NodeParent> {
        match *self {
            Scope::Owner(_) => None,
            Scope::List(id) => Some(NodeParent::List(id)),
            Scope::Item(id) => Some(NodeParent::Item(id)),
        }
    }
}

impl From<NodeParent> for Scope {
    fn from(parent: NodeParent) -> Self {
        match parent {
            NodeParent::List(id) => Scope::List(id),
            NodeParent::Item(id) => Scope::Item(id),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Owner(id) => write!(f, "lists of owner {}", id),
            Scope::List(id) => write!(f, "items of list {}", id),
            Scope::Item(id) => write!(f, "sub-items of item {}", id),
        }
    }
}

/// Reference to a single row, lists and nodes live in separate id spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EntityRef {
    List(ListId),
    Node(NodeId),
}

impl EntityRef {
    pub fn raw_id(&self) -> u32 {
        match *self {
            EntityRef::List(id) | EntityRef::Node(id) => id,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::List(id) => write!(f, "list {}", id),
            EntityRef::Node(id) => write!(f, "node {}", id),
        }
    }
}

/// Positional view of one scope entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    pub index: i32,
}

impl Member {
    pub fn of<T: Entity<Id = u32>>(entity: &T) -> Self {
        Self {
            id: entity.id(),
            index: entity.index(),
        }
    }
}

/// Where an entity sits: its scope and its index inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub scope: Scope,
    pub index: i32,
}
