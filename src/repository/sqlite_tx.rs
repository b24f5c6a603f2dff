//! SQLite Unit of Work
//!
//! `StoreTx` over an open rusqlite transaction. Lists live in `lists`,
//! items and sub-items share `nodes`; the `position` column holds the index.

use chrono::DateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use super::traits::StoreTx;
use crate::domain::{
    DomainError, DomainResult, EntityRef, ListId, Member, Node, NodeId, NodeParent, OwnerId, Scope, TodoList,
};

const LIST_COLUMNS: &str = "id, owner_id, name, comment, position";
const NODE_COLUMNS: &str = "id, list_id, parent_id, name, comment, position, categories, due_time, done, special";

/// Unit of work bound to one SQLite transaction
pub struct SqliteTx<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteTx<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

/// Table, scope column and key for a scope
fn scope_columns(scope: Scope) -> (&'static str, &'static str, u32) {
    match scope {
        Scope::Owner(id) => ("lists", "owner_id", id),
        Scope::List(id) => ("nodes", "list_id", id),
        Scope::Item(id) => ("nodes", "parent_id", id),
    }
}

fn entity_table(entity: EntityRef) -> &'static str {
    match entity {
        EntityRef::List(_) => "lists",
        EntityRef::Node(_) => "nodes",
    }
}

fn row_to_list(row: &Row<'_>) -> rusqlite::Result<TodoList> {
    Ok(TodoList {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        comment: row.get(3)?,
        index: row.get(4)?,
    })
}

/// Raw `nodes` row before the parent columns are resolved
#[derive(Debug)]
struct NodeRow {
    id: NodeId,
    list_id: Option<ListId>,
    parent_id: Option<NodeId>,
    name: String,
    comment: String,
    position: i32,
    categories: String,
    due_time: Option<i64>,
    done: bool,
    special: bool,
}

impl NodeRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            list_id: row.get(1)?,
            parent_id: row.get(2)?,
            name: row.get(3)?,
            comment: row.get(4)?,
            position: row.get(5)?,
            categories: row.get(6)?,
            due_time: row.get(7)?,
            done: row.get(8)?,
            special: row.get(9)?,
        })
    }

    /// Resolve the parent columns into a tagged parent
    fn into_node(self) -> DomainResult<Node> {
        let parent = match (self.list_id, self.parent_id) {
            (Some(list_id), None) => NodeParent::List(list_id),
            (None, Some(parent_id)) => NodeParent::Item(parent_id),
            _ => {
                return Err(DomainError::Internal(format!(
                    "node {} must reference exactly one of list or parent item",
                    self.id
                )))
            }
        };
        let categories: BTreeSet<String> = serde_json::from_str(&self.categories)?;
        let due_time = match self.due_time {
            Some(ms) => Some(DateTime::from_timestamp_millis(ms).ok_or_else(|| {
                DomainError::Internal(format!("node {} has an out of range due time", self.id))
            })?),
            None => None,
        };

        Ok(Node {
            id: self.id,
            parent,
            name: self.name,
            comment: self.comment,
            index: self.position,
            categories,
            due_time,
            done: self.done,
            special: self.special,
        })
    }
}

impl StoreTx for SqliteTx<'_> {
    fn exists(&self, entity: EntityRef) -> DomainResult<bool> {
        let found = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1", entity_table(entity)),
                params![entity.raw_id()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn find_list(&self, id: ListId) -> DomainResult<Option<TodoList>> {
        let list = self
            .conn
            .query_row(
                &format!("SELECT {} FROM lists WHERE id = ?1", LIST_COLUMNS),
                params![id],
                row_to_list,
            )
            .optional()?;
        Ok(list)
    }

    fn find_node(&self, id: NodeId) -> DomainResult<Option<Node>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM nodes WHERE id = ?1", NODE_COLUMNS),
                params![id],
                NodeRow::from_row,
            )
            .optional()?;
        row.map(NodeRow::into_node).transpose()
    }

    fn lists_of(&self, owner_id: OwnerId) -> DomainResult<Vec<TodoList>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM lists WHERE owner_id = ?1 ORDER BY position",
            LIST_COLUMNS
        ))?;
        let lists = stmt
            .query_map(params![owner_id], row_to_list)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lists)
    }

    fn nodes_under(&self, parent: NodeParent) -> DomainResult<Vec<Node>> {
        let (_, column, key) = scope_columns(parent.into());
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM nodes WHERE {} = ?1 ORDER BY position",
            NODE_COLUMNS, column
        ))?;
        let rows = stmt
            .query_map(params![key], NodeRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(NodeRow::into_node).collect()
    }

    fn members(&self, scope: Scope, range: RangeInclusive<i32>) -> DomainResult<Vec<Member>> {
        let (table, column, key) = scope_columns(scope);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, position FROM {} WHERE {} = ?1 AND position >= ?2 AND position <= ?3 ORDER BY position",
            table, column
        ))?;
        let members = stmt
            .query_map(params![key, *range.start(), *range.end()], |row| {
                Ok(Member {
                    id: row.get(0)?,
                    index: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }

    fn max_index(&self, scope: Scope) -> DomainResult<Option<i32>> {
        let (table, column, key) = scope_columns(scope);
        let max = self.conn.query_row(
            &format!("SELECT MAX(position) FROM {} WHERE {} = ?1", table, column),
            params![key],
            |row| row.get::<_, Option<i32>>(0),
        )?;
        Ok(max)
    }

    fn insert_list(&mut self, list: &TodoList) -> DomainResult<()> {
        self.conn.execute(
            "INSERT INTO lists (id, owner_id, name, comment, position) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![list.id, list.owner_id, list.name, list.comment, list.index],
        )?;
        Ok(())
    }

    fn insert_node(&mut self, node: &Node) -> DomainResult<()> {
        let categories = serde_json::to_string(&node.categories)?;
        self.conn.execute(
            "INSERT INTO nodes (id, list_id, parent_id, name, comment, position, categories, due_time, done, special)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                node.id,
                node.list_id(),
                node.parent_node_id(),
                node.name,
                node.comment,
                node.index,
                categories,
                node.due_time.map(|t| t.timestamp_millis()),
                node.done,
                node.special,
            ],
        )?;
        Ok(())
    }

    fn update_list(&mut self, list: &TodoList) -> DomainResult<()> {
        let changed = self.conn.execute(
            "UPDATE lists SET name = ?1, comment = ?2 WHERE id = ?3",
            params![list.name, list.comment, list.id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("list {}", list.id)));
        }
        Ok(())
    }

    fn update_node(&mut self, node: &Node) -> DomainResult<()> {
        let categories = serde_json::to_string(&node.categories)?;
        let changed = self.conn.execute(
            "UPDATE nodes SET name = ?1, comment = ?2, categories = ?3, due_time = ?4, done = ?5, special = ?6 WHERE id = ?7",
            params![
                node.name,
                node.comment,
                categories,
                node.due_time.map(|t| t.timestamp_millis()),
                node.done,
                node.special,
                node.id,
            ],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("node {}", node.id)));
        }
        Ok(())
    }

    fn set_index(&mut self, scope: Scope, id: u32, index: i32) -> DomainResult<()> {
        let (table, column, key) = scope_columns(scope);
        let changed = self.conn.execute(
            &format!("UPDATE {} SET position = ?1 WHERE id = ?2 AND {} = ?3", table, column),
            params![index, id, key],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("member {} of {}", id, scope)));
        }
        Ok(())
    }

    fn remove(&mut self, entity: EntityRef) -> DomainResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", entity_table(entity)),
            params![entity.raw_id()],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(entity.to_string()));
        }
        Ok(())
    }
}
