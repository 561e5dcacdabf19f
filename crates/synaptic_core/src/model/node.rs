//! Host node identity.
//!
//! # Responsibility
//! - Give host node names a distinct type in signatures.
//!
//! # Invariants
//! - A `NodeId` is never empty, whether built or decoded.
//! - Names are kept verbatim; the host decides what they mean.
//! - Existence is owned by the host scene, not by this type.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque name of a node in the host scene graph.
///
/// Decoding goes through `NodeId::new`, so stored ids obey the same rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

/// Rejected node identifier input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyNodeId;

impl Display for EmptyNodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "node id cannot be empty")
    }
}

impl Error for EmptyNodeId {}

impl NodeId {
    /// Wraps a host node name exactly as given.
    pub fn new(name: impl Into<String>) -> Result<Self, EmptyNodeId> {
        let name = name.into();
        if name.is_empty() {
            return Err(EmptyNodeId);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<NodeId> for String {
    fn from(value: NodeId) -> Self {
        value.0
    }
}

impl TryFrom<&str> for NodeId {
    type Error = EmptyNodeId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for NodeId {
    type Error = EmptyNodeId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
