//! Derived backlink index maintenance.
//!
//! # Responsibility
//! - Diff a note's previous and new outgoing links.
//! - Apply the minimal backlink add/remove set to target notes.
//!
//! # Invariants
//! - Cost is proportional to the changed links, not the total.
//! - A failing target never stops the remaining targets.

pub mod backlinks;
