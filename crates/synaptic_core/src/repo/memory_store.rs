//! In-memory host scene.
//!
//! Used as the test double for `NodeStore` and for callers that only need
//! metadata for the lifetime of a process.

use crate::model::node::NodeId;
use crate::repo::node_store::{NodeStore, StoreError, StoreResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct MemoryNode {
    referenced: bool,
    attribute: Option<String>,
}

/// `NodeStore` backed by a `BTreeMap`. Single-threaded.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    nodes: RefCell<BTreeMap<NodeId, MemoryNode>>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node owned by the current scene.
    pub fn create_node(&self, node: &NodeId) -> StoreResult<()> {
        self.insert(node, false)
    }

    /// Adds a node that behaves as referenced from another scene file.
    pub fn create_referenced_node(&self, node: &NodeId) -> StoreResult<()> {
        self.insert(node, true)
    }

    /// Removes a node together with its attribute.
    pub fn delete_node(&self, node: &NodeId) -> StoreResult<()> {
        match self.nodes.borrow_mut().remove(node) {
            Some(_) => Ok(()),
            None => Err(StoreError::NodeNotFound(node.clone())),
        }
    }

    /// Node ids in sorted order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.borrow().keys().cloned().collect()
    }

    fn insert(&self, node: &NodeId, referenced: bool) -> StoreResult<()> {
        let mut nodes = self.nodes.borrow_mut();
        if nodes.contains_key(node) {
            return Err(StoreError::DuplicateNode(node.clone()));
        }
        nodes.insert(
            node.clone(),
            MemoryNode {
                referenced,
                attribute: None,
            },
        );
        Ok(())
    }
}

impl NodeStore for MemoryNodeStore {
    fn node_exists(&self, node: &NodeId) -> StoreResult<bool> {
        Ok(self.nodes.borrow().contains_key(node))
    }

    fn is_referenced(&self, node: &NodeId) -> StoreResult<bool> {
        self.nodes
            .borrow()
            .get(node)
            .map(|entry| entry.referenced)
            .ok_or_else(|| StoreError::NodeNotFound(node.clone()))
    }

    fn read_attribute(&self, node: &NodeId) -> StoreResult<Option<String>> {
        self.nodes
            .borrow()
            .get(node)
            .map(|entry| entry.attribute.clone())
            .ok_or_else(|| StoreError::NodeNotFound(node.clone()))
    }

    fn write_attribute(&self, node: &NodeId, payload: &str) -> StoreResult<()> {
        let mut nodes = self.nodes.borrow_mut();
        let entry = nodes
            .get_mut(node)
            .ok_or_else(|| StoreError::NodeNotFound(node.clone()))?;
        entry.attribute = Some(payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryNodeStore;
    use crate::model::node::NodeId;
    use crate::repo::node_store::{NodeStore, StoreError};

    fn node(name: &str) -> NodeId {
        NodeId::new(name).unwrap()
    }

    #[test]
    fn attribute_lifecycle_follows_node() {
        let store = MemoryNodeStore::new();
        let a = node("A");
        store.create_node(&a).unwrap();

        assert_eq!(store.read_attribute(&a).unwrap(), None);
        store.write_attribute(&a, "{}").unwrap();
        assert_eq!(store.read_attribute(&a).unwrap().as_deref(), Some("{}"));

        store.delete_node(&a).unwrap();
        assert!(!store.node_exists(&a).unwrap());
        assert!(matches!(
            store.read_attribute(&a),
            Err(StoreError::NodeNotFound(_))
        ));
    }

    #[test]
    fn duplicate_nodes_are_rejected() {
        let store = MemoryNodeStore::new();
        store.create_node(&node("A")).unwrap();
        let err = store.create_referenced_node(&node("A")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateNode(_)));
    }

    #[test]
    fn writes_to_unknown_nodes_fail() {
        let store = MemoryNodeStore::new();
        let err = store.write_attribute(&node("ghost"), "{}").unwrap_err();
        assert!(matches!(err, StoreError::NodeNotFound(_)));
    }

    #[test]
    fn referenced_flag_is_reported() {
        let store = MemoryNodeStore::new();
        store.create_node(&node("local")).unwrap();
        store.create_referenced_node(&node("ref")).unwrap();

        assert!(!store.is_referenced(&node("local")).unwrap());
        assert!(store.is_referenced(&node("ref")).unwrap());
        assert_eq!(store.node_ids(), vec![node("local"), node("ref")]);
    }
}
