//! Lifecycle Operations
//!
//! Cascading deletion. Children are removed (and their own scope closed)
//! before the gap of the target is closed and the target row disappears.

use serde::Serialize;
use std::ops::AddAssign;

use super::hierarchy::HierarchyOperations;
use super::positioning::PositioningOperations;
use crate::domain::{DomainError, DomainResult, EntityRef, NodeKind, OwnerId};
use crate::repository::traits::StoreTx;

/// Number of rows removed by a deletion, per level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub lists: usize,
    pub items: usize,
    pub sub_items: usize,
}

impl DeleteReport {
    pub fn total(&self) -> usize {
        self.lists + self.items + self.sub_items
    }
}

impl AddAssign for DeleteReport {
    fn add_assign(&mut self, other: Self) {
        self.lists += other.lists;
        self.items += other.items;
        self.sub_items += other.sub_items;
    }
}

/// Trait for cascading deletes
pub trait LifecycleOperations: HierarchyOperations + PositioningOperations {
    /// Delete `target` with everything below it, leaving every touched
    /// scope dense
    ///
    /// Ownership is not checked here; callers authorize first.
    fn delete_cascade(&mut self, target: EntityRef) -> DomainResult<DeleteReport> {
        let (scope, index, kind) = match target {
            EntityRef::List(id) => {
                let list = self
                    .find_list(id)?
                    .ok_or_else(|| DomainError::NotFound(target.to_string()))?;
                (list.scope(), list.index, None)
            }
            EntityRef::Node(id) => {
                let location = self.locate(id)?;
                (location.scope, location.index, Some(location.kind))
            }
        };

        let mut report = DeleteReport::default();

        // Highest index first, so no child's gap closing shifts a sibling
        // that is about to be removed anyway
        let mut children = self.children(target)?;
        children.reverse();
        for child in children {
            report += self.delete_cascade(child)?;
        }

        self.close_gap(scope, index)?;
        self.remove(target)?;

        match kind {
            None => report.lists += 1,
            Some(NodeKind::Item) => report.items += 1,
            Some(NodeKind::SubItem) => report.sub_items += 1,
        }
        log::debug!("Removed {} at {} of {}", target, index, scope);
        Ok(report)
    }

    /// Delete every list of `owner` with all of their content
    fn delete_owner_lists(&mut self, owner: OwnerId) -> DomainResult<DeleteReport> {
        let mut report = DeleteReport::default();
        for list in self.lists_of(owner)?.into_iter().rev() {
            report += self.delete_cascade(EntityRef::List(list.id))?;
        }
        Ok(report)
    }
}

impl<T: StoreTx + ?Sized> LifecycleOperations for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Member, Node, NodeParent, Scope, TodoList};
    use crate::repository::{EntityStore, MemoryStore};
    use pretty_assertions::assert_eq;

    const OWNER: u32 = 7;

    /// Lists 1, 2 under OWNER. List 1 holds items 10, 11, 12;
    /// item 10 holds sub-items 20, 21, 22.
    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .transaction(|tx| {
                tx.insert_list(&TodoList::new(1, OWNER, "Party".to_string(), String::new(), 0))?;
                tx.insert_list(&TodoList::new(2, OWNER, "Work".to_string(), String::new(), 1))?;
                for (index, id) in [10, 11, 12].into_iter().enumerate() {
                    tx.insert_node(&Node::new(id, NodeParent::List(1), format!("Item {}", id), String::new(), index as i32))?;
                }
                for (index, id) in [20, 21, 22].into_iter().enumerate() {
                    tx.insert_node(&Node::new(id, NodeParent::Item(10), format!("Sub {}", id), String::new(), index as i32))?;
                }
                Ok(())
            })
            .await
            .unwrap();
        store
    }

    async fn members(store: &MemoryStore, scope: Scope) -> Vec<(u32, i32)> {
        store
            .transaction(move |tx| tx.members(scope, 0..=i32::MAX))
            .await
            .unwrap()
            .into_iter()
            .map(|Member { id, index }| (id, index))
            .collect()
    }

    #[tokio::test]
    async fn test_delete_sub_item_compacts_siblings() {
        let store = seeded().await;
        let report = store.transaction(|tx| tx.delete_cascade(EntityRef::Node(20))).await.unwrap();
        assert_eq!(report, DeleteReport { lists: 0, items: 0, sub_items: 1 });
        assert_eq!(members(&store, Scope::Item(10)).await, vec![(21, 0), (22, 1)]);
    }

    #[tokio::test]
    async fn test_delete_item_removes_its_sub_items() {
        let store = seeded().await;
        let report = store.transaction(|tx| tx.delete_cascade(EntityRef::Node(10))).await.unwrap();
        assert_eq!(report, DeleteReport { lists: 0, items: 1, sub_items: 3 });
        assert!(members(&store, Scope::Item(10)).await.is_empty());
        assert_eq!(members(&store, Scope::List(1)).await, vec![(11, 0), (12, 1)]);
    }

    #[tokio::test]
    async fn test_delete_list_cascades_and_compacts_owner_scope() {
        let store = seeded().await;
        let report = store.transaction(|tx| tx.delete_cascade(EntityRef::List(1))).await.unwrap();
        assert_eq!(report, DeleteReport { lists: 1, items: 3, sub_items: 3 });
        assert_eq!(report.total(), 7);

        let (lists, nodes) = store.snapshot().await;
        assert!(nodes.is_empty());
        assert_eq!(lists.len(), 1);
        assert_eq!((lists[0].id, lists[0].index), (2, 0));
    }

    #[tokio::test]
    async fn test_delete_missing_target() {
        let store = seeded().await;
        let result = store.transaction(|tx| tx.delete_cascade(EntityRef::Node(99))).await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_owner_lists() {
        let store = seeded().await;
        let report = store.transaction(|tx| tx.delete_owner_lists(OWNER)).await.unwrap();
        assert_eq!(report, DeleteReport { lists: 2, items: 3, sub_items: 3 });
        let (lists, nodes) = store.snapshot().await;
        assert!(lists.is_empty());
        assert!(nodes.is_empty());
    }

    #[tokio::test]
    async fn test_failure_mid_cascade_rolls_everything_back() {
        let store = seeded().await;
        let before = store.snapshot().await;
        // items 12, 11 and the three sub-items go; removing item 10 is refused
        store.fail_writes_after(Some(5)).await;
        let result = store.transaction(|tx| tx.delete_cascade(EntityRef::List(1))).await;
        assert!(matches!(result, Err(DomainError::Store(_))));

        store.fail_writes_after(None).await;
        assert_eq!(store.snapshot().await, before);
    }
}
