//! Note repository façade over a `RecordStore`.
//!
//! # Responsibility
//! - Be the only code path that encodes/decodes note records.
//! - Keep storage backends swappable without touching link logic.
//!
//! # Invariants
//! - Writes call `Note::validate()` before touching the store.
//! - Reads reject records whose `name` disagrees with their key.

pub mod note_repo;
