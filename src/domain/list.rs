//! List Entity
//!
//! Top level of the hierarchy. Lists are ordered per owner.

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::scope::{ListId, OwnerId, Scope};

/// An ordered todo list belonging to one owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    pub id: ListId,
    pub owner_id: OwnerId,
    pub name: String,
    pub comment: String,
    /// Position among the owner's lists
    pub index: i32,
}

impl TodoList {
    pub fn new(id: ListId, owner_id: OwnerId, name: String, comment: String, index: i32) -> Self {
        Self {
            id,
            owner_id,
            name,
            comment,
            index,
        }
    }

    pub fn scope(&self) -> Scope {
        Scope::Owner(self.owner_id)
    }
}

impl Entity for TodoList {
    type Id = ListId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn index(&self) -> i32 {
        self.index
    }
}

/// Fields supplied when creating a list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDraft {
    pub name: String,
    #[serde(default)]
    pub comment: String,
}

/// Replacement fields for an existing list, `index` may trigger a move
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEdit {
    pub name: String,
    #[serde(default)]
    pub comment: String,
    pub index: i32,
}
