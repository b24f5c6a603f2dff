//! In-Memory Store
//!
//! `EntityStore` backed by ordered maps. A unit of work runs against a copy
//! of the tables; the copy replaces the live tables only when the work
//! succeeds. Parent references are checked like SQL foreign keys.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use tokio::sync::Mutex;

use super::traits::{EntityStore, StoreTx};
use crate::domain::{
    DomainError, DomainResult, Entity, EntityRef, ListId, Member, Node, NodeId, NodeParent, OwnerId, Scope, TodoList,
};

#[derive(Debug, Clone, Default, PartialEq)]
struct Tables {
    lists: BTreeMap<ListId, TodoList>,
    nodes: BTreeMap<NodeId, Node>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: Tables,
    write_budget: Option<usize>,
}

/// Entity store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following transaction fail once it attempts more than
    /// `writes` writes. `None` lifts the limit.
    pub async fn fail_writes_after(&self, writes: Option<usize>) {
        self.inner.lock().await.write_budget = writes;
    }

    /// Copy of all rows, lists and nodes each ordered by id
    pub async fn snapshot(&self) -> (Vec<TodoList>, Vec<Node>) {
        let inner = self.inner.lock().await;
        (
            inner.tables.lists.values().cloned().collect(),
            inner.tables.nodes.values().cloned().collect(),
        )
    }
}

struct MemoryTx {
    tables: Tables,
    writes: usize,
    write_budget: Option<usize>,
}

impl MemoryTx {
    fn charge_write(&mut self) -> DomainResult<()> {
        if let Some(budget) = self.write_budget {
            if self.writes >= budget {
                return Err(DomainError::Store(format!("write {} rejected", self.writes + 1)));
            }
        }
        self.writes += 1;
        Ok(())
    }

    fn scope_members(&self, scope: Scope) -> Vec<Member> {
        let mut members: Vec<Member> = match scope.node_parent() {
            None => self
                .tables
                .lists
                .values()
                .filter(|list| Scope::Owner(list.owner_id) == scope)
                .map(Member::of)
                .collect(),
            Some(parent) => self
                .tables
                .nodes
                .values()
                .filter(|node| node.parent == parent)
                .map(Member::of)
                .collect(),
        };
        members.sort_by_key(|member| (member.index, member.id));
        members
    }

    fn has_children(&self, parent: NodeParent) -> bool {
        self.tables.nodes.values().any(|node| node.parent == parent)
    }
}

impl StoreTx for MemoryTx {
    fn exists(&self, entity: EntityRef) -> DomainResult<bool> {
        Ok(match entity {
            EntityRef::List(id) => self.tables.lists.contains_key(&id),
            EntityRef::Node(id) => self.tables.nodes.contains_key(&id),
        })
    }

    fn find_list(&self, id: ListId) -> DomainResult<Option<TodoList>> {
        Ok(self.tables.lists.get(&id).cloned())
    }

    fn find_node(&self, id: NodeId) -> DomainResult<Option<Node>> {
        Ok(self.tables.nodes.get(&id).cloned())
    }

    fn lists_of(&self, owner_id: OwnerId) -> DomainResult<Vec<TodoList>> {
        let mut lists: Vec<TodoList> = self
            .tables
            .lists
            .values()
            .filter(|list| list.owner_id == owner_id)
            .cloned()
            .collect();
        lists.sort_by_key(Entity::index);
        Ok(lists)
    }

    fn nodes_under(&self, parent: NodeParent) -> DomainResult<Vec<Node>> {
        let mut nodes: Vec<Node> = self
            .tables
            .nodes
            .values()
            .filter(|node| node.parent == parent)
            .cloned()
            .collect();
        nodes.sort_by_key(Entity::index);
        Ok(nodes)
    }

    fn members(&self, scope: Scope, range: RangeInclusive<i32>) -> DomainResult<Vec<Member>> {
        Ok(self
            .scope_members(scope)
            .into_iter()
            .filter(|member| range.contains(&member.index))
            .collect())
    }

    fn max_index(&self, scope: Scope) -> DomainResult<Option<i32>> {
        Ok(self.scope_members(scope).iter().map(|member| member.index).max())
    }

    fn insert_list(&mut self, list: &TodoList) -> DomainResult<()> {
        self.charge_write()?;
        if self.tables.lists.contains_key(&list.id) {
            return Err(DomainError::Store(format!("duplicate list id {}", list.id)));
        }
        self.tables.lists.insert(list.id, list.clone());
        Ok(())
    }

    fn insert_node(&mut self, node: &Node) -> DomainResult<()> {
        self.charge_write()?;
        if self.tables.nodes.contains_key(&node.id) {
            return Err(DomainError::Store(format!("duplicate node id {}", node.id)));
        }
        let parent_exists = match node.parent {
            NodeParent::List(id) => self.tables.lists.contains_key(&id),
            NodeParent::Item(id) => self.tables.nodes.contains_key(&id),
        };
        if !parent_exists {
            return Err(DomainError::Store(format!(
                "node {} references a missing parent",
                node.id
            )));
        }
        self.tables.nodes.insert(node.id, node.clone());
        Ok(())
    }

    fn update_list(&mut self, list: &TodoList) -> DomainResult<()> {
        self.charge_write()?;
        let stored = self
            .tables
            .lists
            .get_mut(&list.id)
            .ok_or_else(|| DomainError::NotFound(format!("list {}", list.id)))?;
        stored.name = list.name.clone();
        stored.comment = list.comment.clone();
        Ok(())
    }

    fn update_node(&mut self, node: &Node) -> DomainResult<()> {
        self.charge_write()?;
        let stored = self
            .tables
            .nodes
            .get_mut(&node.id)
            .ok_or_else(|| DomainError::NotFound(format!("node {}", node.id)))?;
        stored.name = node.name.clone();
        stored.comment = node.comment.clone();
        stored.categories = node.categories.clone();
        stored.due_time = node.due_time;
        stored.done = node.done;
        stored.special = node.special;
        Ok(())
    }

    fn set_index(&mut self, scope: Scope, id: u32, index: i32) -> DomainResult<()> {
        self.charge_write()?;
        let slot = match scope.node_parent() {
            None => self
                .tables
                .lists
                .get_mut(&id)
                .filter(|list| Scope::Owner(list.owner_id) == scope)
                .map(|list| &mut list.index),
            Some(parent) => self
                .tables
                .nodes
                .get_mut(&id)
                .filter(|node| node.parent == parent)
                .map(|node| &mut node.index),
        };
        match slot {
            Some(slot) => {
                *slot = index;
                Ok(())
            }
            None => Err(DomainError::NotFound(format!("member {} of {}", id, scope))),
        }
    }

    fn remove(&mut self, entity: EntityRef) -> DomainResult<()> {
        self.charge_write()?;
        let (child_parent, present) = match entity {
            EntityRef::List(id) => (NodeParent::List(id), self.tables.lists.contains_key(&id)),
            EntityRef::Node(id) => (NodeParent::Item(id), self.tables.nodes.contains_key(&id)),
        };
        if !present {
            return Err(DomainError::NotFound(entity.to_string()));
        }
        if self.has_children(child_parent) {
            return Err(DomainError::Store(format!("{} still has children", entity)));
        }
        match entity {
            EntityRef::List(id) => {
                self.tables.lists.remove(&id);
            }
            EntityRef::Node(id) => {
                self.tables.nodes.remove(&id);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn transaction<F, R>(&self, work: F) -> DomainResult<R>
    where
        F: FnOnce(&mut dyn StoreTx) -> DomainResult<R> + Send,
        R: Send,
    {
        let mut inner = self.inner.lock().await;
        let mut tx = MemoryTx {
            tables: inner.tables.clone(),
            writes: 0,
            write_budget: inner.write_budget,
        };
        let value = work(&mut tx)?;
        inner.tables = tx.tables;
        Ok(value)
    }
}
