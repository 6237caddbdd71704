//! Durable key-value storage contracts and implementations.
//!
//! # Responsibility
//! - Define the named-entry storage contract the document store relies on.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Values are opaque strings; this layer never parses them.
//! - Writes to one key replace the whole previous value (last write wins).

pub mod kv_repo;
