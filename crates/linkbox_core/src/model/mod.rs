//! Domain records persisted in the record store.
//!
//! # Invariants
//! - Every record is keyed by its `name`.
//! - All fields are always present; defaults are applied at construction.

pub mod note;
