//! Domain model for notebooks, notes and their persisted snapshot.
//!
//! # Responsibility
//! - Define the records exchanged with rendering callers.
//! - Define the JSON snapshot shape stored under the snapshot key.
//!
//! # Invariants
//! - Ids and parent references never change after creation.
//! - A notebook owns its notes; a note only refers back to its notebook.

pub mod elapsed;
pub mod id;
pub mod notebook;
pub mod theme;
