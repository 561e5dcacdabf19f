//! Domain model for node metadata.
//!
//! # Responsibility
//! - Define node identity, the stored blob document and tag naming rules.
//! - Stay independent of any host storage implementation.
//!
//! # Invariants
//! - Each host node carries at most one `MetaBlob`.
//! - The tag relation lives inside the blob, never beside it.

pub mod blob;
pub mod node;
pub mod tag;
pub mod value;
