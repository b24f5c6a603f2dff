//! Node Entity
//!
//! A single entity type serving two hierarchy depths: a node whose parent is
//! a list is an item (task), a node whose parent is an item is a sub-item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::entity::Entity;
use super::scope::{ListId, NodeId, NodeParent, Scope};

/// Depth of a node below its list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Item,
    SubItem,
}

impl NodeKind {
    pub fn of(parent: &NodeParent) -> Self {
        match parent {
            NodeParent::List(_) => NodeKind::Item,
            NodeParent::Item(_) => NodeKind::SubItem,
        }
    }

    /// Whether nodes of this kind may own nodes of their own
    pub fn can_own_children(&self) -> bool {
        matches!(self, NodeKind::Item)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Item => "item",
            NodeKind::SubItem => "sub-item",
        }
    }
}

/// A task or subtask
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,
    /// Owning list (item) or owning item (sub-item)
    pub parent: NodeParent,
    pub name: String,
    pub comment: String,
    /// Position within siblings
    pub index: i32,
    pub categories: BTreeSet<String>,
    pub due_time: Option<DateTime<Utc>>,
    /// Completion status
    pub done: bool,
    /// Highlighted by the user
    pub special: bool,
}

impl Node {
    /// Create a node with default metadata
    pub fn new(id: NodeId, parent: NodeParent, name: String, comment: String, index: i32) -> Self {
        Self {
            id,
            parent,
            name,
            comment,
            index,
            categories: BTreeSet::new(),
            due_time: None,
            done: false,
            special: false,
        }
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::of(&self.parent)
    }

    pub fn scope(&self) -> Scope {
        self.parent.into()
    }

    /// List id when this node is a top-level item
    pub fn list_id(&self) -> Option<ListId> {
        match self.parent {
            NodeParent::List(id) => Some(id),
            NodeParent::Item(_) => None,
        }
    }

    /// Parent item id when this node is a sub-item
    pub fn parent_node_id(&self) -> Option<NodeId> {
        match self.parent {
            NodeParent::Item(id) => Some(id),
            NodeParent::List(_) => None,
        }
    }
}

impl Entity for Node {
    type Id = NodeId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn index(&self) -> i32 {
        self.index
    }
}

/// Fields supplied when creating a node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeDraft {
    pub name: String,
    #[serde(default)]
    pub comment: String,
}

/// Replacement fields for an existing node
///
/// `due_time` is raw user text, parsed with the configured format.
/// An empty or missing value clears the due time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEdit {
    pub name: String,
    #[serde(default)]
    pub comment: String,
    pub index: i32,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub due_time: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub special: bool,
}
