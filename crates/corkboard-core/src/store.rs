//! The persisted issue collection.
//!
//! [`IssueStore`] owns the current snapshot, the persistence port and the
//! clock. Every mutation follows the same three steps:
//!
//! 1. authorize against the caller's role and the target's provenance,
//! 2. build the next snapshot without touching the current one,
//! 3. persist the next snapshot, and only then swap it in.
//!
//! A failure at any step returns an error with the store unchanged.

use std::sync::Arc;

use tracing::{debug, info};

use crate::auth::{Action, Role, Target, authorize};
use crate::error::{CorkboardError, Result, ValidationError};
use crate::model::{Clock, Comment, Issue, IssuePatch, Issues, SystemClock};
use crate::normalize::fresh_comment_id;
use crate::reconcile::{MergeReport, merge_append_new_with_report, merge_local_wins_with_report};
use crate::storage::StoragePort;

/// Prefix of ids minted by the board.
pub const ID_PREFIX: &str = "ISSUE-";

/// Asks the user to approve a destructive step.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Next id in the `ISSUE-{n}` sequence for a set of existing ids.
///
/// `n` is one more than the largest number among ids in the `ISSUE-{n}`
/// scheme. Foreign ids (`JIRA-12`, `X-9`) and non-numeric suffixes
/// (`ISSUE-x`) contribute nothing and are kept verbatim in the collection.
#[must_use]
pub fn next_issue_id<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    let max = ids
        .into_iter()
        .filter_map(|id| id.strip_prefix(ID_PREFIX))
        .map(|suffix| suffix.parse::<u64>().unwrap_or(0))
        .max()
        .unwrap_or(0);
    format!("{ID_PREFIX}{}", max.saturating_add(1))
}

/// Persisted issue collection.
#[derive(Debug)]
pub struct IssueStore<P: StoragePort, C: Clock = SystemClock> {
    port: P,
    clock: C,
    issues: Issues,
}

impl<P: StoragePort, C: Clock> IssueStore<P, C> {
    /// Open the store: restore persisted issues, or seed from `baseline` on
    /// first use. An existing collection is re-synced with the baseline
    /// using the local-wins policy.
    ///
    /// # Errors
    ///
    /// Storage errors while loading or persisting the seeded collection.
    pub fn open(port: P, clock: C, baseline: &[Issue]) -> Result<Self> {
        let (mut store, seeded) = Self::load_or_seed(port, clock, baseline)?;
        if !seeded {
            store.resync(baseline.to_vec())?;
        }
        Ok(store)
    }

    /// Like [`IssueStore::open`] but without the re-sync: a persisted
    /// collection is taken as is, so baseline issues deleted locally stay
    /// deleted. The baseline is still used to seed an empty store.
    ///
    /// # Errors
    ///
    /// Storage errors while loading or persisting the seeded collection.
    pub fn restore(port: P, clock: C, baseline: &[Issue]) -> Result<Self> {
        Self::load_or_seed(port, clock, baseline).map(|(store, _)| store)
    }

    fn load_or_seed(port: P, clock: C, baseline: &[Issue]) -> Result<(Self, bool)> {
        let loaded = port.load_issues()?;
        let mut store = Self {
            port,
            clock,
            issues: Arc::from(Vec::new()),
        };
        let seeded = match loaded {
            Some(issues) => {
                debug!(count = issues.len(), "restored persisted issues");
                store.issues = issues.into();
                false
            }
            None => {
                info!(count = baseline.len(), "seeding board from baseline");
                store.commit(baseline.into())?;
                true
            }
        };
        Ok((store, seeded))
    }

    /// Wrap an existing snapshot without loading or saving.
    pub fn from_parts(port: P, clock: C, issues: impl Into<Issues>) -> Self {
        Self {
            port,
            clock,
            issues: issues.into(),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub const fn issues(&self) -> &Issues {
        &self.issues
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    pub const fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Next unused `ISSUE-{n}` id.
    #[must_use]
    pub fn next_id(&self) -> String {
        next_issue_id(self.issues.iter().map(|issue| issue.id.as_str()))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Patch the issue with `id`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Authorization` (edit), or a storage error.
    pub fn update_issue(&mut self, role: Role, id: &str, patch: &IssuePatch) -> Result<Issue> {
        self.modify(role, Action::Edit, id, |issue, now| issue.apply(patch, now))
    }

    /// Change the status of the issue with `id`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Authorization` (move), or a storage error.
    pub fn move_issue(&mut self, role: Role, id: &str, status: &str) -> Result<Issue> {
        let patch = IssuePatch::status(status);
        self.modify(role, Action::Move, id, |issue, now| issue.apply(&patch, now))
    }

    /// Append a comment to the issue with `id`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Authorization` (comment), or a storage error.
    pub fn add_comment(&mut self, role: Role, id: &str, author: &str, body: &str) -> Result<Comment> {
        let updated = self.modify(role, Action::Comment, id, |issue, now| {
            push_comment(issue, author, body, now);
        })?;
        updated
            .comments
            .last()
            .cloned()
            .ok_or_else(|| CorkboardError::NotFound(id.to_string()))
    }

    /// Delete the issue with `id`, returning it.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Authorization` (delete), or a storage error.
    pub fn remove(&mut self, role: Role, id: &str) -> Result<Issue> {
        let index = self.position(id)?;
        authorize(role, Action::Delete, Target::Issue(&self.issues[index]))?;

        let removed = self.issues[index].clone();
        let next: Issues = self
            .issues
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, issue)| issue.clone())
            .collect();
        self.commit(next)?;
        info!(%id, "issue deleted");
        Ok(removed)
    }

    /// Insert `issue` at the front of the collection.
    ///
    /// # Errors
    ///
    /// `Validation(IdCollision)` if the id is taken, or a storage error.
    pub fn prepend(&mut self, issue: Issue) -> Result<()> {
        if self.contains(&issue.id) {
            return Err(ValidationError::IdCollision(issue.id).into());
        }
        let id = issue.id.clone();
        let next: Issues = std::iter::once(issue)
            .chain(self.issues.iter().cloned())
            .collect();
        self.commit(next)?;
        info!(%id, "issue created");
        Ok(())
    }

    /// Append-only import of already-normalized issues.
    ///
    /// # Errors
    ///
    /// A storage error; nothing is written when no issue is new.
    pub fn import(&mut self, incoming: Vec<Issue>) -> Result<MergeReport> {
        let (next, report) = merge_append_new_with_report(&self.issues, incoming);
        self.commit(next)?;
        Ok(report)
    }

    /// Local-wins re-sync with the baseline dataset.
    ///
    /// # Errors
    ///
    /// A storage error; nothing is written when nothing was added.
    pub fn resync(&mut self, baseline: Vec<Issue>) -> Result<MergeReport> {
        let (next, report) = merge_local_wins_with_report(&self.issues, baseline);
        self.commit(next)?;
        Ok(report)
    }

    /// Replace the whole collection with `baseline`. Maintainer-only and
    /// confirmed through `confirm`.
    ///
    /// # Errors
    ///
    /// `Authorization(MaintainerOnly)`, `Cancelled`, or a storage error.
    pub fn replace_all(&mut self, role: Role, baseline: &[Issue], confirm: &impl Confirm) -> Result<()> {
        authorize(role, Action::Reset, Target::Collection)?;
        if !confirm.confirm("Reset the board to the baseline? All local changes will be lost.") {
            return Err(CorkboardError::Cancelled("reset not confirmed"));
        }
        self.commit(baseline.into())?;
        info!(count = baseline.len(), "board reset to baseline");
        Ok(())
    }

    /// Pretty-printed (2-space) JSON array of the collection.
    ///
    /// # Errors
    ///
    /// Serialization failure, which does not occur for well-formed issues.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&*self.issues)?)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn position(&self, id: &str) -> Result<usize> {
        self.issues
            .iter()
            .position(|issue| issue.id == id)
            .ok_or_else(|| CorkboardError::NotFound(id.to_string()))
    }

    /// Authorize, copy-on-write one issue, persist, swap.
    fn modify(
        &mut self,
        role: Role,
        action: Action,
        id: &str,
        change: impl FnOnce(&mut Issue, &str),
    ) -> Result<Issue> {
        let index = self.position(id)?;
        authorize(role, action, Target::Issue(&self.issues[index]))?;

        let now = self.clock.now();
        let mut next = self.issues.to_vec();
        change(&mut next[index], &now);
        let updated = next[index].clone();
        self.commit(next.into())?;
        debug!(%id, ?action, "issue updated");
        Ok(updated)
    }

    /// Persist `next` and make it current. Pointer-equal snapshots are a
    /// no-op.
    fn commit(&mut self, next: Issues) -> Result<()> {
        if Arc::ptr_eq(&next, &self.issues) {
            return Ok(());
        }
        self.port.save_issues(&next)?;
        self.issues = next;
        Ok(())
    }
}

/// Append a comment with an id unique within `issue`, stamping `updated_at`.
pub(crate) fn push_comment(issue: &mut Issue, author: &str, body: &str, now: &str) {
    let comment = Comment {
        id: fresh_comment_id(&issue.comments),
        author: author.to_string(),
        body: body.to_string(),
        created_at: now.to_string(),
    };
    issue.comments.push(comment);
    issue.updated_at = now.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthorizationError;
    use crate::model::time::SteppingClock;
    use crate::storage::MemoryStorage;

    fn issue(id: &str, visitor: bool) -> Issue {
        let mut issue = Issue::blank(id, "2025-01-01T00:00:00.000Z", visitor);
        issue.title = format!("title of {id}");
        issue
    }

    fn store(issues: Vec<Issue>) -> IssueStore<MemoryStorage, SteppingClock> {
        IssueStore::from_parts(MemoryStorage::default(), SteppingClock::default(), issues)
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    #[test]
    fn next_id_counts_only_issue_scheme_ids() {
        assert_eq!(next_issue_id(["ISSUE-3", "ISSUE-1", "X-2"]), "ISSUE-4");
        assert_eq!(next_issue_id(["JIRA-12", "ISSUE-3"]), "ISSUE-4");
        assert_eq!(next_issue_id(["abc", "ISSUE-x", "a-b-5"]), "ISSUE-1");
        assert_eq!(next_issue_id(["abc", "ISSUE-x"]), "ISSUE-1");
        assert_eq!(next_issue_id(std::iter::empty()), "ISSUE-1");
    }

    #[test]
    fn open_seeds_from_baseline_when_empty() {
        let baseline = vec![issue("ISSUE-1", false)];
        let store = IssueStore::open(MemoryStorage::default(), SteppingClock::default(), &baseline)
            .unwrap();
        assert_eq!(store.issues().to_vec(), baseline);
        assert_eq!(store.port().save_count(), 1);
    }

    #[test]
    fn open_resyncs_existing_collection_local_wins() {
        let mut local = issue("ISSUE-1", false);
        local.title = "edited locally".into();
        let port = MemoryStorage::with_issues(std::slice::from_ref(&local));
        let baseline = vec![issue("ISSUE-1", false), issue("ISSUE-2", false)];

        let store = IssueStore::open(port, SteppingClock::default(), &baseline).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("ISSUE-1").unwrap().title, "edited locally");
    }

    #[test]
    fn restore_keeps_local_deletions() {
        let baseline = vec![issue("ISSUE-1", false), issue("ISSUE-2", false)];
        let port = MemoryStorage::with_issues(&baseline[..1]);
        let store = IssueStore::restore(port, SteppingClock::default(), &baseline).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.port().save_count(), 0);

        let store = IssueStore::restore(MemoryStorage::default(), SteppingClock::default(), &baseline)
            .unwrap();
        assert_eq!(store.len(), 2, "an empty store is still seeded");
    }

    #[test]
    fn open_without_changes_does_not_write() {
        let baseline = vec![issue("ISSUE-1", false)];
        let port = MemoryStorage::with_issues(&baseline);
        let store = IssueStore::open(port, SteppingClock::default(), &baseline).unwrap();
        assert_eq!(store.port().save_count(), 0);
    }

    #[test]
    fn update_stamps_updated_at_and_keeps_created_at() {
        let mut store = store(vec![issue("ISSUE-1", false)]);
        let updated = store
            .update_issue(Role::Maintainer, "ISSUE-1", &IssuePatch::title("new"))
            .unwrap();
        assert_eq!(updated.title, "new");
        assert_eq!(updated.created_at, "2025-01-01T00:00:00.000Z");
        assert_eq!(updated.updated_at, "1970-01-01T00:00:00.000Z");
        assert_eq!(store.get("ISSUE-1").unwrap().title, "new");
    }

    #[test]
    fn guest_edit_of_maintainer_issue_is_denied_without_change() {
        let mut store = store(vec![issue("ISSUE-1", false)]);
        let before = Arc::clone(store.issues());
        let err = store
            .update_issue(Role::Guest, "ISSUE-1", &IssuePatch::title("hijack"))
            .unwrap_err();
        assert!(matches!(
            err,
            CorkboardError::Authorization(AuthorizationError::NotPermitted { .. })
        ));
        assert!(Arc::ptr_eq(&before, store.issues()));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut store = store(Vec::new());
        assert!(matches!(
            store.move_issue(Role::Maintainer, "nope", "Done"),
            Err(CorkboardError::NotFound(id)) if id == "nope"
        ));
    }

    #[test]
    fn move_changes_status_only() {
        let mut store = store(vec![issue("ISSUE-1", true)]);
        let moved = store.move_issue(Role::Guest, "ISSUE-1", "Done").unwrap();
        assert_eq!(moved.status, "Done");
        assert_eq!(moved.title, "title of ISSUE-1");
    }

    #[test]
    fn comments_get_unique_ids() {
        let mut store = store(vec![issue("ISSUE-1", true)]);
        let a = store.add_comment(Role::Guest, "ISSUE-1", "ana", "first").unwrap();
        let b = store.add_comment(Role::Guest, "ISSUE-1", "", "second").unwrap();
        assert_ne!(a.id, b.id);
        let stored = store.get("ISSUE-1").unwrap();
        assert_eq!(stored.comments.len(), 2);
        assert_eq!(stored.updated_at, b.created_at);
    }

    #[test]
    fn delete_rules_follow_provenance() {
        let mut store = store(vec![issue("ISSUE-1", false), issue("ISSUE-2", true)]);
        assert!(store.remove(Role::Guest, "ISSUE-1").is_err());
        assert!(store.remove(Role::Guest, "ISSUE-2").is_ok());
        assert!(store.remove(Role::Maintainer, "ISSUE-1").is_ok());
        assert!(store.is_empty());
    }

    #[test]
    fn failed_save_leaves_store_untouched() {
        let mut store = store(vec![issue("ISSUE-1", true)]);
        store.port_mut().fail_saves(true);
        let err = store
            .update_issue(Role::Guest, "ISSUE-1", &IssuePatch::title("lost"))
            .unwrap_err();
        assert!(matches!(err, CorkboardError::Storage(_)));
        assert_eq!(store.get("ISSUE-1").unwrap().title, "title of ISSUE-1");
    }

    #[test]
    fn import_noop_skips_save() {
        let mut store = store(vec![issue("ISSUE-1", false)]);
        let report = store.import(vec![issue("ISSUE-1", true)]).unwrap();
        assert!(report.is_noop());
        assert_eq!(store.port().save_count(), 0);
        assert!(!store.get("ISSUE-1").unwrap().created_by_visitor);
    }

    #[test]
    fn reset_requires_maintainer_and_confirmation() {
        let baseline = vec![issue("ISSUE-9", false)];
        let mut store = store(vec![issue("ISSUE-1", true)]);

        assert!(matches!(
            store.replace_all(Role::Guest, &baseline, &yes),
            Err(CorkboardError::Authorization(AuthorizationError::MaintainerOnly))
        ));
        assert!(matches!(
            store.replace_all(Role::Maintainer, &baseline, &no),
            Err(CorkboardError::Cancelled(_))
        ));
        assert!(store.contains("ISSUE-1"));

        store.replace_all(Role::Maintainer, &baseline, &yes).unwrap();
        assert_eq!(store.issues().to_vec(), baseline);
    }

    #[test]
    fn prepend_rejects_collisions() {
        let mut store = store(vec![issue("ISSUE-1", false)]);
        let err = store.prepend(issue("ISSUE-1", true)).unwrap_err();
        assert!(matches!(
            err,
            CorkboardError::Validation(ValidationError::IdCollision(_))
        ));
        store.prepend(issue("ISSUE-2", true)).unwrap();
        assert_eq!(store.issues()[0].id, "ISSUE-2");
    }

    #[test]
    fn export_is_two_space_pretty_json() {
        let store = store(vec![issue("ISSUE-1", false)]);
        let json = store.export_json().unwrap();
        assert!(json.starts_with("[\n  {\n    \"id\": \"ISSUE-1\""));
    }
}
