//! Note load/save, default materialization and store-wide listings.
//!
//! # Invariants
//! - `save` persists the record verbatim; callers run backlink
//!   synchronization first.
//! - `list_all`, `list_recent` and `search_names` are full scans.

use crate::model::note::{Note, NoteName, NoteValidationError, DEFAULT_CONTENT};
use crate::store::{RecordStore, StoreError};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure to read, decode, validate or write one note record.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    Codec(serde_json::Error),
    Validation(NoteValidationError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "note record codec failure: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Codec(value)
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Typed access to notes stored in `S`.
pub struct NoteRepository<S: RecordStore> {
    store: S,
    default_content: String,
}

impl<S: RecordStore> NoteRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_default_content(store, DEFAULT_CONTENT)
    }

    /// Uses `default_content` as the placeholder body in `load_or_default`.
    pub fn with_default_content(store: S, default_content: impl Into<String>) -> Self {
        Self {
            store,
            default_content: default_content.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Returns the stored note, or `None` when the name is unknown.
    pub fn load(&self, name: &str) -> RepoResult<Option<Note>> {
        let Some(body) = self.store.get(name)? else {
            return Ok(None);
        };
        let note: Note = serde_json::from_str(&body)?;
        note.validate_for_key(name)?;
        Ok(Some(note))
    }

    /// Returns the stored note, or a placeholder that is not persisted.
    pub fn load_or_default(&self, name: &str) -> RepoResult<Note> {
        match self.load(name)? {
            Some(note) => Ok(note),
            None => Ok(Note::new(name, self.default_content.as_str())),
        }
    }

    /// Persists `note` under its own name.
    pub fn save(&mut self, note: &Note) -> RepoResult<()> {
        note.validate()?;
        let body = serde_json::to_string(note)?;
        self.store.put(&note.name, &body)?;
        Ok(())
    }

    /// Every stored note name.
    pub fn list_all(&self) -> RepoResult<Vec<NoteName>> {
        Ok(self.store.keys()?)
    }

    /// Note names ordered by `last_modified` descending, then name ascending.
    ///
    /// Records that fail to decode are skipped with a warning; store
    /// failures are returned.
    pub fn list_recent(&self, limit: Option<usize>) -> RepoResult<Vec<NoteName>> {
        let mut dated = Vec::new();
        for name in self.store.keys()? {
            match self.load(&name) {
                Ok(Some(note)) => dated.push((note.last_modified, note.name)),
                Ok(None) => {}
                Err(RepoError::Store(err)) => return Err(RepoError::Store(err)),
                Err(err) => warn!(
                    "event=note_list_recent module=repo status=skip error_code=undecodable_record error={err}"
                ),
            }
        }

        dated.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        let names = dated.into_iter().map(|(_, name)| name);
        Ok(match limit {
            Some(limit) => names.take(limit).collect(),
            None => names.collect(),
        })
    }

    /// Names containing `term` (case-sensitive); an empty term matches all.
    pub fn search_names(&self, term: &str) -> RepoResult<Vec<NoteName>> {
        let mut names = self.list_all()?;
        names.retain(|name| name.contains(term));
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteRepository, RepoError};
    use crate::model::note::{Note, DEFAULT_CONTENT};
    use crate::store::{MemoryRecordStore, RecordStore};
    use chrono::{Duration, Utc};

    #[test]
    fn load_or_default_materializes_placeholder_without_persisting() {
        let repo = NoteRepository::new(MemoryRecordStore::new());
        let note = repo.load_or_default("Fresh").expect("default note");
        assert_eq!(note.name, "Fresh");
        assert_eq!(note.content, DEFAULT_CONTENT);
        assert!(repo.store().is_empty());
    }

    #[test]
    fn load_rejects_record_stored_under_other_key() {
        let mut store = MemoryRecordStore::new();
        let body = serde_json::to_string(&Note::new("other", "x")).expect("encode");
        store.put("key", &body).expect("put");

        let repo = NoteRepository::new(store);
        let err = repo.load("key").expect_err("mismatch must fail");
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[test]
    fn load_reports_codec_errors() {
        let mut store = MemoryRecordStore::new();
        store.put("broken", "{not json").expect("put");
        let repo = NoteRepository::new(store);
        assert!(matches!(repo.load("broken"), Err(RepoError::Codec(_))));
    }

    #[test]
    fn list_recent_orders_by_last_modified_and_skips_garbage() {
        let mut repo = NoteRepository::new(MemoryRecordStore::new());
        let now = Utc::now();
        for (name, age_minutes) in [("old", 30), ("new", 1), ("mid", 10), ("mid2", 10)] {
            let mut note = Note::new(name, "");
            note.last_modified = now - Duration::minutes(age_minutes);
            repo.save(&note).expect("save");
        }
        let mut store = repo.into_store();
        store.put("garbage", "[]").expect("put garbage");
        let repo = NoteRepository::new(store);

        assert_eq!(
            repo.list_recent(None).expect("recent"),
            vec!["new", "mid", "mid2", "old"]
        );
        assert_eq!(repo.list_recent(Some(2)).expect("recent"), vec!["new", "mid"]);
    }

    #[test]
    fn search_names_is_case_sensitive_substring() {
        let mut repo = NoteRepository::new(MemoryRecordStore::new());
        for name in ["Rust", "rusty", "Go"] {
            repo.save(&Note::new(name, "")).expect("save");
        }
        assert_eq!(repo.search_names("Rus").expect("search"), vec!["Rust"]);
        assert_eq!(repo.search_names("").expect("search").len(), 3);
    }

    #[test]
    fn save_rejects_empty_name() {
        let mut repo = NoteRepository::new(MemoryRecordStore::new());
        let err = repo.save(&Note::new("", "x")).expect_err("empty name");
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
