//! Lightweight per-node metadata for host scene graphs.
//!
//! Attach a JSON key/value blob to any host node and tag other nodes under
//! string keys for name-agnostic lookup.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::blob::{DataMap, MetaBlob, BLOB_FORMAT_VERSION};
pub use model::node::{EmptyNodeId, NodeId};
pub use model::tag::is_valid_tag_name;
pub use repo::memory_store::MemoryNodeStore;
pub use repo::node_store::{NodeStore, StoreError, StoreResult};
pub use repo::sqlite_store::SqliteNodeStore;
pub use service::metadata_service::{MetaError, MetaResult, MetadataAccessor, MetadataHandle};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_matches_manifest() {
        assert_eq!(core_version(), "1.0.1");
    }
}
