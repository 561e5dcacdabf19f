//! Metadata accessor use-cases.
//!
//! # Responsibility
//! - Resolve or lazily create the metadata blob of a host node.
//! - Provide value and tag operations on top of any `NodeStore`.
//!
//! # Invariants
//! - Handles cache nothing: every call reads the attribute, applies one
//!   change and writes it back, so handles over one node always agree.
//! - Writes on referenced nodes only touch the transient layer.
//! - Attribute text that is not JSON reads as an empty blob. JSON that does
//!   not form a valid blob, and newer blob versions, are rejected.

use crate::model::blob::{DataMap, MetaBlob, BLOB_FORMAT_VERSION};
use crate::model::node::NodeId;
use crate::model::tag::is_valid_tag_name;
use crate::model::value::ensure_json_representable;
use crate::repo::node_store::{NodeStore, StoreError};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type MetaResult<T> = Result<T, MetaError>;

/// Error for metadata use-cases.
#[derive(Debug)]
pub enum MetaError {
    /// Node is absent from the host scene.
    NodeNotFound(NodeId),
    /// Value cannot be represented as JSON, or stored JSON does not fit the
    /// requested type.
    Serialization(serde_json::Error),
    /// Tag name is not a valid attribute identifier.
    InvalidTag(String),
    /// Stored attribute is JSON but not a valid blob document.
    InvalidBlob { node: NodeId, message: String },
    /// Stored blob was written by a newer format.
    UnsupportedBlobVersion { found: u32, latest_supported: u32 },
    /// Host storage failure.
    Store(StoreError),
}

impl Display for MetaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(node) => write!(f, "node not found: {node}"),
            Self::Serialization(err) => write!(f, "value is not JSON serialisable: {err}"),
            Self::InvalidTag(value) => write!(f, "invalid tag name: `{value}`"),
            Self::InvalidBlob { node, message } => {
                write!(f, "invalid metadata blob on {node}: {message}")
            }
            Self::UnsupportedBlobVersion {
                found,
                latest_supported,
            } => write!(
                f,
                "metadata blob version {found} is newer than supported {latest_supported}"
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MetaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialization(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for MetaError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NodeNotFound(node) => Self::NodeNotFound(node),
            other => Self::Store(other),
        }
    }
}

impl From<serde_json::Error> for MetaError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Entry point resolving host nodes to metadata handles.
pub struct MetadataAccessor<S: NodeStore> {
    store: S,
}

impl<S: NodeStore> MetadataAccessor<S> {
    /// Creates an accessor over the provided host store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrows the underlying host store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the metadata handle for `node`, creating an empty blob first
    /// when the node has none.
    ///
    /// # Errors
    /// - `NodeNotFound` when the host scene has no such node.
    /// - `InvalidBlob` when the stored JSON is not a blob document.
    /// - `UnsupportedBlobVersion` when the stored blob is from a newer format.
    pub fn get(&self, node: &NodeId) -> MetaResult<MetadataHandle<'_, S>> {
        if let Some(handle) = self.existing(node)? {
            return Ok(handle);
        }

        let blob = MetaBlob::default();
        self.store.write_attribute(node, &blob.to_attribute()?)?;
        info!("event=meta_create module=service status=ok node={node}");
        Ok(MetadataHandle::new(&self.store, node.clone()))
    }

    /// Returns a handle only when `node` already carries metadata.
    pub fn existing(&self, node: &NodeId) -> MetaResult<Option<MetadataHandle<'_, S>>> {
        if !self.has_meta(node)? {
            return Ok(None);
        }

        let handle = MetadataHandle::new(&self.store, node.clone());
        handle.load()?;
        Ok(Some(handle))
    }

    /// Returns whether `node` already carries metadata.
    pub fn has_meta(&self, node: &NodeId) -> MetaResult<bool> {
        if !self.store.node_exists(node)? {
            return Err(MetaError::NodeNotFound(node.clone()));
        }
        Ok(self.store.read_attribute(node)?.is_some())
    }
}

/// View over one node's metadata blob.
pub struct MetadataHandle<'a, S: NodeStore> {
    store: &'a S,
    host: NodeId,
}

impl<'a, S: NodeStore> MetadataHandle<'a, S> {
    fn new(store: &'a S, host: NodeId) -> Self {
        Self { store, host }
    }

    /// The node this metadata describes.
    pub fn host(&self) -> &NodeId {
        &self.host
    }

    /// Stores `value` under `key`, replacing any prior value.
    ///
    /// # Errors
    /// - `Serialization` when `value` cannot be represented as JSON,
    ///   including NaN and infinite floats.
    pub fn set<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> MetaResult<()> {
        ensure_json_representable(value)?;
        let value = serde_json::to_value(value)?;
        let referenced = self.store.is_referenced(&self.host)?;

        let mut blob = self.load()?;
        blob.insert_value(key, value, referenced);
        self.save(&blob)?;

        debug!(
            "event=meta_set module=service status=ok node={} key={} layer={}",
            self.host,
            key,
            if referenced { "transient" } else { "persistent" }
        );
        Ok(())
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> MetaResult<Option<Value>> {
        let blob = self.load()?;
        Ok(blob.value(key).cloned())
    }

    /// Returns the value stored under `key`, or `default` when absent.
    pub fn get_or(&self, key: &str, default: Value) -> MetaResult<Value> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Returns the value stored under `key` decoded as `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> MetaResult<Option<T>> {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Returns every key with transient values stamped over persistent ones.
    pub fn data(&self) -> MetaResult<DataMap> {
        Ok(self.load()?.merged())
    }

    /// Associates `target` with `tag_name`. Tagging the same target twice
    /// keeps a single entry.
    ///
    /// # Errors
    /// - `InvalidTag` when `tag_name` is not an attribute identifier.
    /// - `NodeNotFound` when `target` is not in the host scene.
    pub fn tag(&self, tag_name: &str, target: &NodeId) -> MetaResult<()> {
        ensure_tag_name(tag_name)?;
        if !self.store.node_exists(target)? {
            return Err(MetaError::NodeNotFound(target.clone()));
        }

        let mut blob = self.load()?;
        if blob.add_tag_target(tag_name, target.clone()) {
            self.save(&blob)?;
        }

        debug!(
            "event=meta_tag module=service status=ok node={} tag={} target={}",
            self.host, tag_name, target
        );
        Ok(())
    }

    /// Removes `target` from `tag_name`. Returns `false` when it was not tagged.
    pub fn untag(&self, tag_name: &str, target: &NodeId) -> MetaResult<bool> {
        ensure_tag_name(tag_name)?;

        let mut blob = self.load()?;
        let removed = blob.remove_tag_target(tag_name, target);
        if removed {
            self.save(&blob)?;
            debug!(
                "event=meta_untag module=service status=ok node={} tag={} target={}",
                self.host, tag_name, target
            );
        }
        Ok(removed)
    }

    /// Returns every node tagged under `tag_name`, in tagging order.
    pub fn find_all(&self, tag_name: &str) -> MetaResult<Vec<NodeId>> {
        let blob = self.load()?;
        Ok(blob.tag_targets(tag_name).to_vec())
    }

    /// Returns the first node tagged under `tag_name`.
    pub fn find_first(&self, tag_name: &str) -> MetaResult<Option<NodeId>> {
        let blob = self.load()?;
        Ok(blob.tag_targets(tag_name).first().cloned())
    }

    /// Returns the names of all tags with at least one target, sorted.
    pub fn tags(&self) -> MetaResult<Vec<String>> {
        Ok(self.load()?.tag_names())
    }

    fn load(&self) -> MetaResult<MetaBlob> {
        let Some(text) = self.store.read_attribute(&self.host)? else {
            return Ok(MetaBlob::default());
        };

        let blob = match MetaBlob::from_attribute(&text) {
            Ok(blob) => blob,
            Err(err) if err.is_data() => {
                return Err(MetaError::InvalidBlob {
                    node: self.host.clone(),
                    message: err.to_string(),
                });
            }
            Err(err) => {
                warn!(
                    "event=meta_decode module=service status=error node={} error={}",
                    self.host, err
                );
                return Ok(MetaBlob::default());
            }
        };

        if blob.version > BLOB_FORMAT_VERSION {
            return Err(MetaError::UnsupportedBlobVersion {
                found: blob.version,
                latest_supported: BLOB_FORMAT_VERSION,
            });
        }
        Ok(blob)
    }

    fn save(&self, blob: &MetaBlob) -> MetaResult<()> {
        let text = blob.to_attribute()?;
        self.store.write_attribute(&self.host, &text)?;
        Ok(())
    }
}

fn ensure_tag_name(tag_name: &str) -> MetaResult<()> {
    if is_valid_tag_name(tag_name) {
        Ok(())
    } else {
        Err(MetaError::InvalidTag(tag_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{MetaError, MetadataAccessor};
    use crate::model::node::NodeId;
    use crate::repo::memory_store::MemoryNodeStore;
    use crate::repo::node_store::NodeStore;
    use serde_json::json;

    fn node(name: &str) -> NodeId {
        NodeId::new(name).unwrap()
    }

    #[test]
    fn get_writes_an_empty_blob_once() {
        let store = MemoryNodeStore::new();
        store.create_node(&node("A")).unwrap();
        let accessor = MetadataAccessor::new(&store);

        assert!(!accessor.has_meta(&node("A")).unwrap());
        accessor.get(&node("A")).unwrap().set("k", &1).unwrap();
        accessor.get(&node("A")).unwrap();

        let text = store.read_attribute(&node("A")).unwrap().unwrap();
        assert!(text.contains("\"k\":1"));
    }

    #[test]
    fn load_treats_malformed_attribute_as_empty() {
        let store = MemoryNodeStore::new();
        store.create_node(&node("A")).unwrap();
        store.write_attribute(&node("A"), "not json").unwrap();
        let accessor = MetadataAccessor::new(&store);

        let meta = accessor.get(&node("A")).unwrap();
        assert_eq!(meta.get("anything").unwrap(), None);
        meta.set("fresh", &true).unwrap();
        assert_eq!(meta.get("fresh").unwrap(), Some(json!(true)));
    }

    #[test]
    fn store_not_found_maps_to_meta_not_found() {
        let store = MemoryNodeStore::new();
        let accessor = MetadataAccessor::new(&store);

        let err = accessor.get(&node("missing")).err().unwrap();
        assert!(matches!(err, MetaError::NodeNotFound(ref id) if id.as_str() == "missing"));
    }
}
