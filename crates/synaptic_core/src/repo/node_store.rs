//! Host scene collaborator contract.
//!
//! # Responsibility
//! - Describe the only host capabilities metadata needs: node existence,
//!   reference state and one opaque text attribute per node.
//! - Give store implementations one shared error vocabulary.
//!
//! # Invariants
//! - Attribute reads/writes on unknown nodes fail with `NodeNotFound`.
//! - Stores never interpret attribute text.

use crate::model::node::NodeId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by host store implementations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite error.
    Sqlite(rusqlite::Error),
    /// Scene database was written by a newer schema.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Node is not part of the host scene.
    NodeNotFound(NodeId),
    /// Node already exists in the host scene.
    DuplicateNode(NodeId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted scene data cannot be read back.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "scene schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::NodeNotFound(node) => write!(f, "node not found: {node}"),
            Self::DuplicateNode(node) => write!(f, "node already exists: {node}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "node store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid scene data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Node storage exposed by the host application.
pub trait NodeStore {
    /// Returns whether `node` is part of the host scene.
    fn node_exists(&self, node: &NodeId) -> StoreResult<bool>;
    /// Returns whether `node` was brought in from another scene file.
    fn is_referenced(&self, node: &NodeId) -> StoreResult<bool>;
    /// Reads the metadata attribute, `None` when it was never written.
    fn read_attribute(&self, node: &NodeId) -> StoreResult<Option<String>>;
    /// Creates or replaces the metadata attribute.
    fn write_attribute(&self, node: &NodeId, payload: &str) -> StoreResult<()>;
}

impl<S: NodeStore + ?Sized> NodeStore for &S {
    fn node_exists(&self, node: &NodeId) -> StoreResult<bool> {
        (**self).node_exists(node)
    }

    fn is_referenced(&self, node: &NodeId) -> StoreResult<bool> {
        (**self).is_referenced(node)
    }

    fn read_attribute(&self, node: &NodeId) -> StoreResult<Option<String>> {
        (**self).read_attribute(node)
    }

    fn write_attribute(&self, node: &NodeId, payload: &str) -> StoreResult<()> {
        (**self).write_attribute(node, payload)
    }
}
