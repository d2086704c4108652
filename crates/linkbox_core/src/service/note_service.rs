//! Note editing workflow.
//!
//! # Invariants
//! - `save_note` synchronizes backlinks before persisting the edited note.
//! - `&mut self` on `save_note` serializes saves; a second save cannot start
//!   while one is in flight on the same service.
//! - A failed primary persist is always an `Err`, and the backlink changes
//!   made for it are reverted; partial backlink synchronization is an `Ok`
//!   with failures in the report.
//! - A primary record that no longer decodes is replaced by the next save.

use crate::config::{NotesConfig, DEFAULT_RECENT_LIMIT};
use crate::link::{bare_links, render_text};
use crate::model::note::{Note, NoteName};
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult};
use crate::store::RecordStore;
use crate::sync::backlinks::{synchronize, SyncReport};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of the primary note in a use-case.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Note name is empty.
    InvalidName(String),
    /// Reading or writing the primary record failed.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "invalid note name: `{value}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidName(_) => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of a save whose primary record was persisted.
#[derive(Debug)]
pub struct SaveOutcome {
    /// The record as persisted.
    pub note: Note,
    /// Backlink effects on other notes.
    pub sync: SyncReport,
}

impl SaveOutcome {
    /// `false` when some target's backlinks could not be updated.
    pub fn is_fully_synced(&self) -> bool {
        self.sync.is_complete()
    }
}

/// Note use-case service owning a repository.
pub struct NoteService<S: RecordStore> {
    repo: NoteRepository<S>,
    recent_limit: usize,
}

impl<S: RecordStore> NoteService<S> {
    pub fn new(repo: NoteRepository<S>) -> Self {
        Self {
            repo,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    /// Builds a service over `store` using `[notes]` config values.
    pub fn from_config(store: S, config: &NotesConfig) -> Self {
        Self {
            repo: NoteRepository::with_default_content(store, config.default_content.as_str()),
            recent_limit: config.recent_limit,
        }
    }

    pub fn repo(&self) -> &NoteRepository<S> {
        &self.repo
    }

    pub fn into_repo(self) -> NoteRepository<S> {
        self.repo
    }

    /// Replaces the content of `name`, maintaining backlinks on every
    /// note it starts or stops referencing.
    ///
    /// # Errors
    /// - `InvalidName` for an empty name; nothing is touched.
    /// - `Repo` when the store cannot serve the previous record or the edited
    ///   record cannot be written. On a failed write the backlink updates
    ///   already applied to other notes are reverted.
    pub fn save_note(
        &mut self,
        name: &str,
        content: impl Into<String>,
    ) -> Result<SaveOutcome, NoteServiceError> {
        if name.is_empty() {
            return Err(NoteServiceError::InvalidName(name.to_string()));
        }

        let content = content.into();
        let old_links = self.previous_links(name)?;
        let links = bare_links(&content);

        let sync = synchronize(&mut self.repo, name, &old_links, &links)?;
        let note = Note {
            name: name.to_string(),
            content,
            links,
            backlinks: sync.backlinks.clone(),
            last_modified: Utc::now(),
            recent: self.recent_with(name),
        };

        if let Err(err) = self.repo.save(&note) {
            error!(
                "event=note_save module=service status=error error_code=primary_persist_failed error={err}"
            );
            self.revert_sync(name, &note.links, &old_links);
            return Err(err.into());
        }

        let status = if sync.is_complete() { "ok" } else { "partial" };
        info!(
            "event=note_save module=service status={status} links={} backlinks={} updated={} failed={}",
            note.links.len(),
            note.backlinks.len(),
            sync.updated.len(),
            sync.failures.len()
        );
        Ok(SaveOutcome { note, sync })
    }

    /// Re-asserts `name` in the backlinks of every note it links to.
    ///
    /// Repairs targets skipped by an earlier partial synchronization.
    /// Stale backlinks elsewhere are only removed by saving their source.
    pub fn resync_note(&mut self, name: &str) -> Result<SyncReport, NoteServiceError> {
        let Some(note) = self.repo.load(name)? else {
            return Ok(SyncReport::default());
        };
        let report = synchronize(&mut self.repo, name, &BTreeSet::new(), &note.links)?;
        info!(
            "event=note_resync module=service status={} updated={} failed={}",
            if report.is_complete() { "ok" } else { "partial" },
            report.updated.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Stored note, or an unsaved placeholder.
    pub fn open_note(&self, name: &str) -> RepoResult<Note> {
        self.repo.load_or_default(name)
    }

    /// Display text of `name` with references rewritten.
    pub fn render_note(&self, name: &str) -> RepoResult<String> {
        Ok(render_text(&self.open_note(name)?.content))
    }

    /// Names by most recent modification, capped at `recent_limit`.
    pub fn recent_notes(&self) -> RepoResult<Vec<NoteName>> {
        self.repo.list_recent(Some(self.recent_limit))
    }

    pub fn search_notes(&self, term: &str) -> RepoResult<Vec<NoteName>> {
        self.repo.search_names(term)
    }

    /// Links of the stored record, or an empty set when it does not decode.
    fn previous_links(&self, name: &str) -> Result<BTreeSet<NoteName>, NoteServiceError> {
        match self.repo.load(name) {
            Ok(note) => Ok(note.map(|note| note.links).unwrap_or_default()),
            Err(err @ (RepoError::Codec(_) | RepoError::Validation(_))) => {
                warn!(
                    "event=note_save module=service status=degraded error_code=unreadable_record_replaced error={err}"
                );
                Ok(BTreeSet::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Undoes a synchronization whose primary record was never written.
    fn revert_sync(
        &mut self,
        name: &str,
        applied: &BTreeSet<NoteName>,
        previous: &BTreeSet<NoteName>,
    ) {
        match synchronize(&mut self.repo, name, applied, previous) {
            Ok(report) if report.is_complete() => info!(
                "event=note_save_revert module=service status=ok updated={}",
                report.updated.len()
            ),
            Ok(report) => warn!(
                "event=note_save_revert module=service status=partial updated={} failed={}",
                report.updated.len(),
                report.failures.len()
            ),
            Err(err) => warn!("event=note_save_revert module=service status=error error={err}"),
        }
    }

    /// `name` first, then other recent names. Advisory only, so a scan
    /// failure degrades to `[name]` instead of failing the save.
    fn recent_with(&self, name: &str) -> Vec<NoteName> {
        let others = match self.repo.list_recent(None) {
            Ok(names) => names,
            Err(err) => {
                warn!("event=note_save module=service status=degraded error_code=recent_scan_failed error={err}");
                Vec::new()
            }
        };
        std::iter::once(name.to_string())
            .chain(others.into_iter().filter(|other| other != name))
            .take(self.recent_limit.max(1))
            .collect()
    }
}

/// Human-readable age of a note, e.g. `last edited: 5 minutes ago`.
pub fn describe_last_edited(last_modified: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = if now >= last_modified {
        now - last_modified
    } else {
        last_modified - now
    };
    let days = elapsed.num_days();
    let hours = elapsed.num_hours() % 24;
    let minutes = elapsed.num_minutes() % 60;

    if days >= 1 {
        format!("last edited: {days} days ago")
    } else if hours >= 1 {
        format!("last edited: {hours} hours ago")
    } else {
        format!("last edited: {minutes} minutes ago")
    }
}

#[cfg(test)]
mod tests {
    use super::{describe_last_edited, NoteService};
    use crate::config::NotesConfig;
    use crate::repo::note_repo::NoteRepository;
    use crate::store::MemoryRecordStore;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn new_service_uses_configured_default_recent_limit() {
        let service = NoteService::new(NoteRepository::new(MemoryRecordStore::new()));
        assert_eq!(service.recent_limit, NotesConfig::default().recent_limit);
    }

    #[test]
    fn describe_last_edited_picks_largest_unit() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(
            describe_last_edited(now - Duration::minutes(7), now),
            "last edited: 7 minutes ago"
        );
        assert_eq!(
            describe_last_edited(now - Duration::minutes(150), now),
            "last edited: 2 hours ago"
        );
        assert_eq!(
            describe_last_edited(now - Duration::days(3) - Duration::hours(5), now),
            "last edited: 3 days ago"
        );
    }

    #[test]
    fn describe_last_edited_tolerates_future_timestamps() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(
            describe_last_edited(now + Duration::minutes(2), now),
            "last edited: 2 minutes ago"
        );
    }
}
