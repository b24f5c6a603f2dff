//! Database Connection and Setup
//!
//! Manages the SQLite connection, migrations and transaction boundaries.

use async_trait::async_trait;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::sqlite_tx::SqliteTx;
use super::traits::{EntityStore, StoreTx};
use crate::domain::DomainResult;

/// SQLite-backed entity store
///
/// One connection guarded by an async mutex: units of work run one at a
/// time, each inside its own SQLite transaction.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Wrap a connection that has already been migrated
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn open_in_memory() -> DomainResult<Self> {
        let conn = Connection::open_in_memory()?;
        prepare(conn)
    }
}

/// Open (or create) the database at `db_path` and run migrations
pub fn init_db(db_path: &Path) -> DomainResult<SqliteStore> {
    let conn = Connection::open(db_path)?;
    log::info!("Opened todo store at {}", db_path.display());
    prepare(conn)
}

fn prepare(conn: Connection) -> DomainResult<SqliteStore> {
    // Must be set outside of any transaction
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    run_migrations(&conn)?;
    Ok(SqliteStore::new(Arc::new(Mutex::new(conn))))
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS lists (
            id INTEGER PRIMARY KEY,
            owner_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            comment TEXT NOT NULL DEFAULT '',
            position INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_lists_owner ON lists(owner_id, position);

        CREATE TABLE IF NOT EXISTS nodes (
            id INTEGER PRIMARY KEY,
            list_id INTEGER REFERENCES lists(id),
            parent_id INTEGER REFERENCES nodes(id),
            name TEXT NOT NULL,
            comment TEXT NOT NULL DEFAULT '',
            position INTEGER NOT NULL,
            categories TEXT NOT NULL DEFAULT '[]',
            due_time INTEGER,
            done INTEGER NOT NULL DEFAULT 0,
            special INTEGER NOT NULL DEFAULT 0,
            CHECK ((list_id IS NULL) <> (parent_id IS NULL))
        );
        CREATE INDEX IF NOT EXISTS idx_nodes_list ON nodes(list_id, position);
        CREATE INDEX IF NOT EXISTS idx_nodes_parent ON nodes(parent_id, position);",
    )?;
    Ok(())
}

/// Run `work` inside a transaction on `conn`, committing only on success
fn run_in_transaction<F, R>(conn: &mut Connection, work: F) -> DomainResult<R>
where
    F: FnOnce(&mut dyn StoreTx) -> DomainResult<R>,
{
    let tx = conn.transaction()?;
    // Dropping `tx` without commit rolls back
    let value = work(&mut SqliteTx::new(&tx))?;
    tx.commit()?;
    Ok(value)
}

#[async_trait]
impl EntityStore for SqliteStore {
    async fn transaction<F, R>(&self, work: F) -> DomainResult<R>
    where
        F: FnOnce(&mut dyn StoreTx) -> DomainResult<R> + Send,
        R: Send,
    {
        let mut conn = self.conn.lock().await;
        run_in_transaction(&mut conn, work)
    }
}
