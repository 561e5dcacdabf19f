//! Core use-case services.
//!
//! # Responsibility
//! - Turn host store calls into metadata-level operations.
//! - Keep callers decoupled from attribute encoding and storage details.

pub mod metadata_service;
