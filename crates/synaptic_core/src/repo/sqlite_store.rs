//! SQLite-backed stand-in for a host scene.
//!
//! # Responsibility
//! - Persist scene nodes and their single metadata attribute.
//! - Keep SQL details inside the store boundary.
//!
//! # Invariants
//! - The connection must be fully migrated (`db::open_db*`).
//! - Deleting a node cascades to its attribute row.
//! - `is_referenced` is stored as `0`/`1` and anything else is rejected.

use crate::db::migrations::latest_version;
use crate::model::node::NodeId;
use crate::repo::node_store::{NodeStore, StoreError, StoreResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

/// `NodeStore` over the `nodes` / `node_attributes` tables.
pub struct SqliteNodeStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNodeStore<'conn> {
    /// Constructs a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Adds a node owned by the current scene.
    pub fn create_node(&self, node: &NodeId) -> StoreResult<()> {
        self.insert_node(node, false)
    }

    /// Adds a node that behaves as referenced from another scene file.
    pub fn create_referenced_node(&self, node: &NodeId) -> StoreResult<()> {
        self.insert_node(node, true)
    }

    /// Removes a node together with its attribute.
    pub fn delete_node(&self, node: &NodeId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM nodes WHERE node_id = ?1;", [node.as_str()])?;
        if changed == 0 {
            return Err(StoreError::NodeNotFound(node.clone()));
        }
        debug!("event=node_delete module=store status=ok node={node}");
        Ok(())
    }

    /// Node ids in sorted order.
    pub fn node_ids(&self) -> StoreResult<Vec<NodeId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT node_id FROM nodes ORDER BY node_id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut nodes = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            nodes.push(parse_node_id(value)?);
        }
        Ok(nodes)
    }

    fn insert_node(&self, node: &NodeId, referenced: bool) -> StoreResult<()> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO nodes (node_id, is_referenced) VALUES (?1, ?2);",
            params![node.as_str(), bool_to_int(referenced)],
        )?;
        if inserted == 0 {
            return Err(StoreError::DuplicateNode(node.clone()));
        }
        debug!(
            "event=node_create module=store status=ok node={} referenced={}",
            node, referenced
        );
        Ok(())
    }

    fn require_node(&self, node: &NodeId) -> StoreResult<()> {
        if !self.node_exists(node)? {
            return Err(StoreError::NodeNotFound(node.clone()));
        }
        Ok(())
    }
}

impl NodeStore for SqliteNodeStore<'_> {
    fn node_exists(&self, node: &NodeId) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM nodes WHERE node_id = ?1);",
            [node.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn is_referenced(&self, node: &NodeId) -> StoreResult<bool> {
        let value: Option<i64> = self
            .conn
            .query_row(
                "SELECT is_referenced FROM nodes WHERE node_id = ?1;",
                [node.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            None => Err(StoreError::NodeNotFound(node.clone())),
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            Some(other) => Err(StoreError::InvalidData(format!(
                "invalid is_referenced value `{other}` in nodes.is_referenced"
            ))),
        }
    }

    fn read_attribute(&self, node: &NodeId) -> StoreResult<Option<String>> {
        self.require_node(node)?;
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM node_attributes WHERE node_id = ?1;",
                [node.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn write_attribute(&self, node: &NodeId, payload: &str) -> StoreResult<()> {
        self.require_node(node)?;
        self.conn.execute(
            "INSERT INTO node_attributes (node_id, payload) VALUES (?1, ?2)
             ON CONFLICT(node_id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![node.as_str(), payload],
        )?;
        Ok(())
    }
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

fn parse_node_id(value: String) -> StoreResult<NodeId> {
    NodeId::new(value)
        .map_err(|_| StoreError::InvalidData("empty node id in nodes.node_id".to_string()))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
