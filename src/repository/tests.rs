//! Repository Integration Tests
//!
//! Tests for SqliteStore with in-memory and on-disk SQLite databases.

#[cfg(test)]
mod tests {
    use crate::config::CoreConfig;
    use crate::domain::{DomainError, EntityRef, ListDraft, Node, NodeDraft, NodeEdit, NodeParent, Scope, TodoList};
    use crate::repository::{init_db, DeleteReport, EntityStore, SqliteStore};
    use crate::service::TodoService;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    const OWNER: u32 = 7;

    fn setup_test_db() -> SqliteStore {
        SqliteStore::open_in_memory().expect("Failed to init test DB")
    }

    fn setup_service() -> TodoService<SqliteStore> {
        TodoService::new(setup_test_db(), &CoreConfig::default())
    }

    fn named(name: &str) -> NodeDraft {
        NodeDraft {
            name: name.to_string(),
            comment: String::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = setup_test_db();
        let (list, item) = store
            .transaction(|tx| {
                tx.insert_list(&TodoList::new(1, OWNER, "Groceries".to_string(), "weekly".to_string(), 0))?;
                tx.insert_node(&Node::new(2, NodeParent::List(1), "Milk".to_string(), String::new(), 0))?;
                Ok((tx.find_list(1)?, tx.find_node(2)?))
            })
            .await
            .expect("Insert failed");

        assert_eq!(list.unwrap().comment, "weekly");
        assert_eq!(item.unwrap().parent, NodeParent::List(1));
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let store = setup_test_db();
        let (list, node, exists) = store
            .transaction(|tx| Ok((tx.find_list(1)?, tx.find_node(1)?, tx.exists(EntityRef::List(1))?)))
            .await
            .unwrap();
        assert!(list.is_none());
        assert!(node.is_none());
        assert!(!exists);
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let store = setup_test_db();
        let orphan = store
            .transaction(|tx| tx.insert_node(&Node::new(1, NodeParent::List(99), "x".to_string(), String::new(), 0)))
            .await;
        assert!(matches!(orphan, Err(DomainError::Store(_))));

        let parent_removed = store
            .transaction(|tx| {
                tx.insert_list(&TodoList::new(5, OWNER, "L".to_string(), String::new(), 0))?;
                tx.insert_node(&Node::new(1, NodeParent::List(5), "x".to_string(), String::new(), 0))?;
                tx.remove(EntityRef::List(5))
            })
            .await;
        assert!(matches!(parent_removed, Err(DomainError::Store(_))));
    }

    #[tokio::test]
    async fn test_failed_work_is_rolled_back() {
        let store = setup_test_db();
        let result: Result<(), DomainError> = store
            .transaction(|tx| {
                tx.insert_list(&TodoList::new(1, OWNER, "Gone".to_string(), String::new(), 0))?;
                Err(DomainError::Internal("abort".to_string()))
            })
            .await;
        assert!(result.is_err());

        let lists = store.transaction(|tx| tx.lists_of(OWNER)).await.unwrap();
        assert!(lists.is_empty());
    }

    #[tokio::test]
    async fn test_members_and_max_index() {
        let store = setup_test_db();
        let (members, max, empty_max) = store
            .transaction(|tx| {
                for id in 1..=4 {
                    tx.insert_list(&TodoList::new(id, OWNER, format!("L{}", id), String::new(), id as i32 - 1))?;
                }
                Ok((
                    tx.members(Scope::Owner(OWNER), 1..=2)?,
                    tx.max_index(Scope::Owner(OWNER))?,
                    tx.max_index(Scope::List(1))?,
                ))
            })
            .await
            .unwrap();

        assert_eq!(members.iter().map(|m| m.id).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(max, Some(3));
        assert_eq!(empty_max, None);
    }

    #[tokio::test]
    async fn test_move_and_delete_through_service() {
        let service = setup_service();
        let list = service
            .create_list(OWNER, ListDraft { name: "Party".to_string(), comment: String::new() })
            .await
            .unwrap();
        let a = service.create_node(OWNER, NodeParent::List(list.id), named("A")).await.unwrap();
        let b = service.create_node(OWNER, NodeParent::List(list.id), named("B")).await.unwrap();
        let c = service.create_node(OWNER, NodeParent::List(list.id), named("C")).await.unwrap();
        service.create_node(OWNER, NodeParent::Item(c.id), named("C1")).await.unwrap();

        service.move_entity(OWNER, EntityRef::Node(b.id), 2).await.unwrap();
        let report = service.delete_entity(OWNER, EntityRef::Node(c.id)).await.unwrap();
        assert_eq!(report.sub_items, 1);

        let nodes = service.nodes(OWNER, NodeParent::List(list.id)).await.unwrap();
        assert_eq!(
            nodes.iter().map(|n| (n.id, n.index)).collect::<Vec<_>>(),
            vec![(a.id, 0), (b.id, 1)]
        );
    }

    #[tokio::test]
    async fn test_sub_item_moves_and_list_cascade() {
        let service = setup_service();
        let mut lists = Vec::new();
        for name in ["Home", "Garden", "Work"] {
            let draft = ListDraft { name: name.to_string(), comment: String::new() };
            lists.push(service.create_list(OWNER, draft).await.unwrap());
        }
        let garden = lists[1].id;
        let mut items = Vec::new();
        for name in ["Plant", "Water"] {
            items.push(service.create_node(OWNER, NodeParent::List(garden), named(name)).await.unwrap());
        }
        let parent = NodeParent::Item(items[0].id);
        let mut subs = Vec::new();
        for n in 0..5 {
            subs.push(service.create_node(OWNER, parent, named(&format!("S{}", n))).await.unwrap().id);
        }
        service.create_node(OWNER, NodeParent::Item(items[1].id), named("Hose")).await.unwrap();

        // s4 to the front, then the new second (s0) to the back
        service.move_entity(OWNER, EntityRef::Node(subs[4]), 0).await.unwrap();
        service.move_entity(OWNER, EntityRef::Node(subs[0]), 4).await.unwrap();
        let order = service.list_siblings(OWNER, Scope::Item(items[0].id)).await.unwrap();
        assert_eq!(
            order.iter().map(|m| (m.id, m.index)).collect::<Vec<_>>(),
            vec![(subs[4], 0), (subs[1], 1), (subs[2], 2), (subs[3], 3), (subs[0], 4)]
        );

        service.delete_entity(OWNER, EntityRef::Node(subs[2])).await.unwrap();
        let order = service.list_siblings(OWNER, Scope::Item(items[0].id)).await.unwrap();
        assert_eq!(order.iter().map(|m| m.index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);

        let report = service.delete_entity(OWNER, EntityRef::List(garden)).await.unwrap();
        assert_eq!(report, DeleteReport { lists: 1, items: 2, sub_items: 5 });
        let remaining = service.lists(OWNER).await.unwrap();
        assert_eq!(
            remaining.iter().map(|l| (l.id, l.index)).collect::<Vec<_>>(),
            vec![(lists[0].id, 0), (lists[2].id, 1)]
        );
    }

    #[tokio::test]
    async fn test_metadata_persistence() {
        let service = setup_service();
        let list = service
            .create_list(OWNER, ListDraft { name: "Work".to_string(), comment: String::new() })
            .await
            .unwrap();
        let item = service.create_node(OWNER, NodeParent::List(list.id), named("Report")).await.unwrap();

        let edit = NodeEdit {
            name: "Report".to_string(),
            comment: "quarterly".to_string(),
            index: 0,
            categories: BTreeSet::from(["office".to_string()]),
            due_time: Some("2077-12-10 13:13".to_string()),
            done: false,
            special: true,
        };
        let edited = service.edit_node(OWNER, item.id, edit).await.unwrap();

        let found = service
            .store()
            .transaction(move |tx| tx.find_node(item.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, edited);
        assert!(found.categories.contains("office"));
    }

    #[tokio::test]
    async fn test_reopen_keeps_data_and_migrations_are_idempotent() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("todo.db");

        {
            let store = init_db(&db_path).unwrap();
            store
                .transaction(|tx| tx.insert_list(&TodoList::new(1, OWNER, "Kept".to_string(), String::new(), 0)))
                .await
                .unwrap();
        }

        let reopened = init_db(&db_path).unwrap();
        let lists = reopened.transaction(|tx| tx.lists_of(OWNER)).await.unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "Kept");
    }

    #[tokio::test]
    async fn test_open_from_config() {
        let tmp = TempDir::new().unwrap();
        let mut config = CoreConfig::default();
        config.database.path = tmp.path().join("configured.db");

        let service = TodoService::open(&config).unwrap();
        service
            .create_list(OWNER, ListDraft { name: "Inbox".to_string(), comment: String::new() })
            .await
            .unwrap();
        assert!(config.database.path.exists());
    }
}
