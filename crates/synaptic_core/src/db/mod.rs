//! SQLite backing for the stand-in host scene.
//!
//! # Responsibility
//! - Open and configure connections used by `SqliteNodeStore`.
//! - Apply scene schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Nodes and attributes are not touched before migrations succeed.
//!
//! Failures are reported as `StoreError`, the store's own error type.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
