//! Link graph consistency engine for linkbox.
//! Parses wiki-links, renders them for display, and keeps every note's
//! backlinks consistent with the links of the notes that reference it.

pub mod config;
pub mod db;
pub mod link;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod sync;

pub use config::{ConfigError, LinkboxConfig, StoreBackend};
pub use link::{bare_links, classify, extract_references, render, render_text, LinkRef, RawToken};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::note::{default_note_name, Note, NoteName, NoteValidationError, DEFAULT_CONTENT};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult};
pub use service::note_service::{describe_last_edited, NoteService, NoteServiceError, SaveOutcome};
pub use store::{MemoryRecordStore, RecordStore, SqliteRecordStore, StoreError, StoreResult};
pub use sync::backlinks::{synchronize, SyncAction, SyncFailure, SyncPlan, SyncReport};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
