//! Note record model.
//!
//! # Responsibility
//! - Define the single serialized shape stored for each note name.
//! - Provide constructors for explicit saves, placeholders and
//!   backlink-synthesized records.
//!
//! # Invariants
//! - `name` is non-empty and equals the record store key.
//! - `links` and `backlinks` are sets; duplicates cannot accumulate.
//! - `backlinks` is only mutated by backlink synchronization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store key and reference target of a note.
pub type NoteName = String;

/// Placeholder content shown for notes that have never been saved.
pub const DEFAULT_CONTENT: &str = "## Info:\n\n\
This is a \"box\" of notes.\n\n\
You can edit notes writing regular markdown.\n\n\
You can link to any note in your box using the convention **[[~note_name]]**.\n\
- This creates bi-directional links.\n\n\
A list of all notes that link to the present note are under a header **Backlinks**.";

/// Validation failures for note records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// `name` is empty and cannot serve as a store key.
    EmptyName,
    /// The stored record names a different note than its key.
    NameMismatch { key: String, name: String },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "note name cannot be empty"),
            Self::NameMismatch { key, name } => {
                write!(f, "record stored under `{key}` is named `{name}`")
            }
        }
    }
}

impl Error for NoteValidationError {}

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub name: NoteName,
    /// Raw markdown text, may embed `[[reference]]` tokens.
    pub content: String,
    /// Bare names of normal references found in `content`.
    #[serde(default)]
    pub links: BTreeSet<NoteName>,
    /// Names of notes whose content references this note.
    #[serde(default)]
    pub backlinks: BTreeSet<NoteName>,
    /// Serialized as RFC 3339, e.g. `2024-05-01T10:00:00Z`.
    pub last_modified: DateTime<Utc>,
    /// Advisory recency ordering captured at the last save.
    #[serde(default)]
    pub recent: Vec<NoteName>,
}

impl Note {
    /// Creates an empty note with `last_modified` set to now.
    pub fn new(name: impl Into<NoteName>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            links: BTreeSet::new(),
            backlinks: BTreeSet::new(),
            last_modified: Utc::now(),
            recent: Vec::new(),
        }
    }

    /// Record synthesized for a reference target that does not exist yet.
    ///
    /// Content and links are empty; the referrer is the only backlink.
    pub fn referenced_by(name: impl Into<NoteName>, referrer: impl Into<NoteName>) -> Self {
        let mut note = Self::new(name, String::new());
        note.backlinks.insert(referrer.into());
        note
    }

    /// Checks the record can be stored under its own name.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.name.is_empty() {
            return Err(NoteValidationError::EmptyName);
        }
        Ok(())
    }

    /// Checks the record can be stored under `key`.
    pub fn validate_for_key(&self, key: &str) -> Result<(), NoteValidationError> {
        self.validate()?;
        if self.name != key {
            return Err(NoteValidationError::NameMismatch {
                key: key.to_string(),
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Default note name used when none is given: today's local date, `YYYY-MM-DD`.
pub fn default_note_name() -> NoteName {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
