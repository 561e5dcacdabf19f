//! Host storage contract and implementations.
//!
//! # Responsibility
//! - Define the `NodeStore` seam between metadata logic and the host scene.
//! - Provide an in-memory fake and a SQLite-backed stand-in scene.
//!
//! # Invariants
//! - Stores return semantic errors (`NodeNotFound`) in addition to transport
//!   errors.
//! - Stores treat attribute payloads as opaque text.

pub mod memory_store;
pub mod node_store;
pub mod sqlite_store;
