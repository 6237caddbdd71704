//! Core persistence for NoteKeeper.
//! This crate owns notebooks, notes and the durable snapshot behind them.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::elapsed::format_elapsed;
pub use model::id::{Clock, IdGenerator, SystemClock};
pub use model::notebook::{
    NewNote, Note, NoteId, NotePatch, Notebook, NotebookId, Snapshot, UNTITLED_NAME,
};
pub use model::theme::Theme;
pub use repo::kv_repo::{KvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use service::document_store::{DocumentStore, StoreError, StoreResult, SNAPSHOT_KEY};
pub use service::theme_service::{ThemeService, THEME_KEY};

/// Minimal health-check API for linkage probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
