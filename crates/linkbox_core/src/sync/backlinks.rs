//! Backlink synchronizer.
//!
//! After a save, for every note `T`: `T.backlinks` contains `S` iff
//! `S.links` contains `T`, for every `S` whose last synchronization completed.
//! Each target update is one load-modify-store unit; nothing spans targets.

use crate::model::note::{Note, NoteName};
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult};
use crate::store::RecordStore;
use log::{debug, warn};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Minimal backlink mutations implied by a link set change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Targets that must drop the source from their backlinks.
    pub removed: BTreeSet<NoteName>,
    /// Targets that must gain the source in their backlinks.
    pub added: BTreeSet<NoteName>,
}

impl SyncPlan {
    /// Computes `old - new` and `new - old`, ignoring empty names.
    pub fn between(old_links: &BTreeSet<NoteName>, new_links: &BTreeSet<NoteName>) -> Self {
        let non_empty = |name: &&NoteName| !name.is_empty();
        Self {
            removed: old_links
                .difference(new_links)
                .filter(non_empty)
                .cloned()
                .collect(),
            added: new_links
                .difference(old_links)
                .filter(non_empty)
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Direction of one backlink mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    AddBacklink,
    RemoveBacklink,
}

impl Display for SyncAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddBacklink => f.write_str("add_backlink"),
            Self::RemoveBacklink => f.write_str("remove_backlink"),
        }
    }
}

/// A target whose backlink update was abandoned.
#[derive(Debug)]
pub struct SyncFailure {
    pub target: NoteName,
    pub action: SyncAction,
    pub error: RepoError,
}

/// Outcome of one synchronization pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Backlinks of the source note, read back after the pass.
    pub backlinks: BTreeSet<NoteName>,
    /// Targets whose stored record changed (including synthesized ones).
    pub updated: Vec<NoteName>,
    /// Targets created because they had no record yet.
    pub synthesized: Vec<NoteName>,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reconciles other notes' backlinks after `note_name` changed its links
/// from `old_links` to `new_links`.
///
/// # Errors
/// Only a store failure while reading back the source note's own record is
/// fatal; a source record that does not decode yields empty backlinks. Every
/// target failure is collected into `SyncReport::failures`.
pub fn synchronize<S: RecordStore>(
    repo: &mut NoteRepository<S>,
    note_name: &str,
    old_links: &BTreeSet<NoteName>,
    new_links: &BTreeSet<NoteName>,
) -> RepoResult<SyncReport> {
    let mut report = SyncReport::default();
    if note_name.is_empty() {
        warn!("event=backlink_sync module=sync status=skip error_code=empty_source_name");
        return Ok(report);
    }

    let plan = SyncPlan::between(old_links, new_links);
    debug!(
        "event=backlink_sync module=sync status=start removed={} added={}",
        plan.removed.len(),
        plan.added.len()
    );

    for target in &plan.removed {
        let outcome = remove_backlink(repo, target, note_name);
        record(&mut report, target, SyncAction::RemoveBacklink, outcome);
    }
    for target in &plan.added {
        let outcome = add_backlink(repo, target, note_name);
        record(&mut report, target, SyncAction::AddBacklink, outcome);
    }

    report.backlinks = match repo.load(note_name) {
        Ok(note) => note.map(|note| note.backlinks).unwrap_or_default(),
        Err(err @ RepoError::Store(_)) => return Err(err),
        Err(err) => {
            warn!(
                "event=backlink_sync module=sync status=degraded error_code=unreadable_source error={err}"
            );
            BTreeSet::new()
        }
    };

    if report.is_complete() {
        debug!(
            "event=backlink_sync module=sync status=ok updated={} synthesized={}",
            report.updated.len(),
            report.synthesized.len()
        );
    } else {
        warn!(
            "event=backlink_sync module=sync status=partial updated={} failed={}",
            report.updated.len(),
            report.failures.len()
        );
    }
    Ok(report)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetChange {
    Unchanged,
    Updated,
    Synthesized,
}

fn record(
    report: &mut SyncReport,
    target: &str,
    action: SyncAction,
    outcome: RepoResult<TargetChange>,
) {
    match outcome {
        Ok(TargetChange::Unchanged) => {}
        Ok(TargetChange::Updated) => report.updated.push(target.to_string()),
        Ok(TargetChange::Synthesized) => {
            report.updated.push(target.to_string());
            report.synthesized.push(target.to_string());
        }
        Err(error) => {
            warn!(
                "event=backlink_sync module=sync status=error action={action} target={target} error={error}"
            );
            report.failures.push(SyncFailure {
                target: target.to_string(),
                action,
                error,
            });
        }
    }
}

fn remove_backlink<S: RecordStore>(
    repo: &mut NoteRepository<S>,
    target: &str,
    source: &str,
) -> RepoResult<TargetChange> {
    let Some(mut note) = repo.load(target)? else {
        return Ok(TargetChange::Unchanged);
    };
    if !note.backlinks.remove(source) {
        return Ok(TargetChange::Unchanged);
    }
    repo.save(&note)?;
    Ok(TargetChange::Updated)
}

fn add_backlink<S: RecordStore>(
    repo: &mut NoteRepository<S>,
    target: &str,
    source: &str,
) -> RepoResult<TargetChange> {
    match repo.load(target)? {
        Some(mut note) => {
            if !note.backlinks.insert(source.to_string()) {
                return Ok(TargetChange::Unchanged);
            }
            repo.save(&note)?;
            Ok(TargetChange::Updated)
        }
        None => {
            repo.save(&Note::referenced_by(target, source))?;
            Ok(TargetChange::Synthesized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SyncPlan;
    use std::collections::BTreeSet;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn plan_contains_only_changed_links() {
        let plan = SyncPlan::between(&set(&["a", "b", "c"]), &set(&["b", "c", "d"]));
        assert_eq!(plan.removed, set(&["a"]));
        assert_eq!(plan.added, set(&["d"]));
    }

    #[test]
    fn plan_for_identical_sets_is_empty() {
        let links = set(&["a", "b"]);
        assert!(SyncPlan::between(&links, &links).is_empty());
    }

    #[test]
    fn plan_never_targets_empty_name() {
        let plan = SyncPlan::between(&set(&[""]), &set(&["", "x"]));
        assert!(plan.removed.is_empty());
        assert_eq!(plan.added, set(&["x"]));

        let plan = SyncPlan::between(&set(&["", "y"]), &set(&[]));
        assert_eq!(plan.removed, set(&["y"]));
    }
}
