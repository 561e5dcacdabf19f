//! Metadata blob document stored on a host node attribute.
//!
//! # Responsibility
//! - Define the JSON document persisted as the node's single attribute.
//! - Own the persistent/transient layering and tag relation edits.
//!
//! # Invariants
//! - Reads overlay `transient` on top of `persistent`.
//! - A persistent write clears the transient entry for that key.
//! - A tag target appears at most once per tag, in insertion order.
//! - Tags with no targets are not kept in the document.

use crate::model::node::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Latest blob document version written by this crate.
pub const BLOB_FORMAT_VERSION: u32 = 1;

/// Key/value layer of a blob.
pub type DataMap = Map<String, Value>;

/// Canonical metadata document for one host node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaBlob {
    /// Document format version.
    #[serde(default = "legacy_version")]
    pub version: u32,
    /// Values authored in the scene that owns the node.
    #[serde(default)]
    pub persistent: DataMap,
    /// Values authored while the node is referenced into another scene.
    #[serde(default)]
    pub transient: DataMap,
    /// Tag name -> tagged node ids.
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<NodeId>>,
}

impl Default for MetaBlob {
    fn default() -> Self {
        Self {
            version: BLOB_FORMAT_VERSION,
            persistent: DataMap::new(),
            transient: DataMap::new(),
            tags: BTreeMap::new(),
        }
    }
}

// Documents written before the version field existed.
fn legacy_version() -> u32 {
    BLOB_FORMAT_VERSION
}

impl MetaBlob {
    /// Parses attribute text into a blob document.
    pub fn from_attribute(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Serializes the document into attribute text.
    pub fn to_attribute(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Stores `value` in the layer selected by `referenced`.
    ///
    /// A persistent write drops any transient override of the same key, so
    /// the new value is what reads return.
    pub fn insert_value(&mut self, key: impl Into<String>, value: Value, referenced: bool) {
        let key = key.into();
        if referenced {
            self.transient.insert(key, value);
        } else {
            self.transient.remove(&key);
            self.persistent.insert(key, value);
        }
    }

    /// Looks up one key with transient values taking precedence.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.transient.get(key).or_else(|| self.persistent.get(key))
    }

    /// Returns all keys with transient values stamped over persistent ones.
    pub fn merged(&self) -> DataMap {
        let mut merged = self.persistent.clone();
        for (key, value) in &self.transient {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Appends `target` to `tag`. Returns `false` when already tagged.
    pub fn add_tag_target(&mut self, tag: &str, target: NodeId) -> bool {
        let targets = self.tags.entry(tag.to_string()).or_default();
        if targets.contains(&target) {
            return false;
        }
        targets.push(target);
        true
    }

    /// Removes `target` from `tag`. Returns `false` when nothing changed.
    pub fn remove_tag_target(&mut self, tag: &str, target: &NodeId) -> bool {
        let Some(targets) = self.tags.get_mut(tag) else {
            return false;
        };
        let before = targets.len();
        targets.retain(|current| current != target);
        let removed = targets.len() != before;
        if targets.is_empty() {
            self.tags.remove(tag);
        }
        removed
    }

    /// Tagged node ids in insertion order.
    pub fn tag_targets(&self, tag: &str) -> &[NodeId] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tag names that currently reference at least one node, sorted.
    pub fn tag_names(&self) -> Vec<String> {
        self.tags
            .iter()
            .filter(|(_, targets)| !targets.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{MetaBlob, BLOB_FORMAT_VERSION};
    use crate::model::node::NodeId;
    use serde_json::json;

    fn node(name: &str) -> NodeId {
        NodeId::new(name).unwrap()
    }

    #[test]
    fn missing_sections_decode_as_empty() {
        let blob = MetaBlob::from_attribute("{}").unwrap();
        assert_eq!(blob, MetaBlob::default());
        assert_eq!(blob.version, BLOB_FORMAT_VERSION);
    }

    #[test]
    fn transient_layer_overrides_persistent_on_read() {
        let mut blob = MetaBlob::default();
        blob.insert_value("rig_scale", json!(1.0), false);
        blob.insert_value("colour", json!("red"), false);
        blob.insert_value("colour", json!("blue"), true);

        assert_eq!(blob.value("colour"), Some(&json!("blue")));
        assert_eq!(blob.persistent.get("colour"), Some(&json!("red")));

        let merged = blob.merged();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("colour"), Some(&json!("blue")));
        assert_eq!(merged.get("rig_scale"), Some(&json!(1.0)));
    }

    #[test]
    fn persistent_write_clears_stale_transient_override() {
        let mut blob = MetaBlob::default();
        blob.insert_value("colour", json!("blue"), true);
        blob.insert_value("other", json!(1), true);
        blob.insert_value("colour", json!("green"), false);

        assert_eq!(blob.value("colour"), Some(&json!("green")));
        assert!(!blob.transient.contains_key("colour"));
        assert_eq!(blob.transient.get("other"), Some(&json!(1)));
    }

    #[test]
    fn tag_targets_keep_insertion_order_without_duplicates() {
        let mut blob = MetaBlob::default();
        assert!(blob.add_tag_target("deformers", node("skin2")));
        assert!(blob.add_tag_target("deformers", node("skin1")));
        assert!(!blob.add_tag_target("deformers", node("skin2")));

        assert_eq!(blob.tag_targets("deformers"), &[node("skin2"), node("skin1")]);
        assert!(blob.tag_targets("unknown").is_empty());
    }

    #[test]
    fn removing_last_target_drops_the_tag() {
        let mut blob = MetaBlob::default();
        blob.add_tag_target("root", node("hips"));

        assert!(!blob.remove_tag_target("root", &node("spine")));
        assert!(blob.remove_tag_target("root", &node("hips")));
        assert!(blob.tags.is_empty());
        assert!(blob.tag_names().is_empty());
    }

    #[test]
    fn attribute_text_round_trips_tags_and_layers() {
        let mut blob = MetaBlob::default();
        blob.insert_value("nested", json!({"a": [1, 2, {"b": null}]}), false);
        blob.add_tag_target("rainbow", node("B"));

        let text = blob.to_attribute().unwrap();
        let decoded = MetaBlob::from_attribute(&text).unwrap();
        assert_eq!(decoded, blob);
    }
}
