//! The board: one store, one session, one draft slot.
//!
//! [`Board`] is the surface a view layer drives. It routes every call that
//! names the pending draft's id to the draft instead of the store, so an
//! unsaved issue can be edited, commented on and discarded exactly like a
//! persisted one, but never moved and never persisted by accident.

use serde_json::Value;
use tracing::info;

use crate::auth::{Action, Role, SecretVerifier, Session, Target, authorize};
use crate::draft::DraftWorkflow;
use crate::error::{CorkboardError, Result};
use crate::model::{Clock, Column, Comment, Issue, IssuePatch, Issues, StatusSet, SystemClock, group_by_status};
use crate::normalize::{normalize_text, normalize_value};
use crate::reconcile::MergeReport;
use crate::storage::StoragePort;
use crate::store::{Confirm, IssueStore};

/// What a delete removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deleted {
    /// A persisted issue was removed from the collection.
    Issue(Issue),
    /// The unsaved draft was discarded.
    Draft(Issue),
}

impl Deleted {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Issue(issue) | Self::Draft(issue) => &issue.id,
        }
    }
}

/// Store, session and draft wired together.
#[derive(Debug)]
pub struct Board<P: StoragePort, C: Clock = SystemClock> {
    store: IssueStore<P, C>,
    session: Session,
    draft: DraftWorkflow,
    baseline: Vec<Issue>,
    statuses: StatusSet,
}

impl<P: StoragePort, C: Clock> Board<P, C> {
    /// Open the board over `port`.
    ///
    /// The collection is seeded from (or re-synced with) `baseline`. The
    /// status set is the canonical workflow plus every status used by the
    /// baseline plus `extra_statuses`.
    ///
    /// # Errors
    ///
    /// Storage errors while loading the collection or role.
    pub fn open(port: P, clock: C, baseline: Vec<Issue>, extra_statuses: &[String]) -> Result<Self> {
        let session = Session::load(&port)?;
        let store = IssueStore::open(port, clock, &baseline)?;
        Ok(Self::assemble(store, session, baseline, extra_statuses))
    }

    /// Open the board without re-syncing an existing collection. Short-lived
    /// callers that run once per command use this and re-sync explicitly
    /// through [`Board::resync`].
    ///
    /// # Errors
    ///
    /// Storage errors while loading the collection or role.
    pub fn restore(port: P, clock: C, baseline: Vec<Issue>, extra_statuses: &[String]) -> Result<Self> {
        let session = Session::load(&port)?;
        let store = IssueStore::restore(port, clock, &baseline)?;
        Ok(Self::assemble(store, session, baseline, extra_statuses))
    }

    fn assemble(
        store: IssueStore<P, C>,
        session: Session,
        baseline: Vec<Issue>,
        extra_statuses: &[String],
    ) -> Self {
        let mut statuses = StatusSet::observed_in(&baseline);
        statuses.extend(extra_statuses.iter().map(String::as_str));

        info!(issues = store.len(), role = %session.role(), "board opened");
        Self {
            store,
            session,
            draft: DraftWorkflow::new(),
            baseline,
            statuses,
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.session.role()
    }

    #[must_use]
    pub const fn issues(&self) -> &Issues {
        self.store.issues()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.draft
            .pending()
            .filter(|draft| draft.id == id)
            .or_else(|| self.store.get(id))
    }

    #[must_use]
    pub const fn store(&self) -> &IssueStore<P, C> {
        &self.store
    }

    #[must_use]
    pub const fn draft(&self) -> &DraftWorkflow {
        &self.draft
    }

    #[must_use]
    pub const fn statuses(&self) -> &StatusSet {
        &self.statuses
    }

    /// Ask the gate whether `action` on `id` would be allowed, changing
    /// nothing. Views call this before prompting for confirmation.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, or the gate's `Authorization` refusal.
    pub fn check(&self, action: Action, id: &str) -> Result<()> {
        if self.draft.holds(id) {
            return Ok(authorize(self.role(), action, Target::Draft)?);
        }
        let issue = self
            .store
            .get(id)
            .ok_or_else(|| CorkboardError::NotFound(id.to_string()))?;
        Ok(authorize(self.role(), action, Target::Issue(issue))?)
    }

    /// Persisted issues grouped into status columns.
    #[must_use]
    pub fn columns(&self) -> Vec<Column<'_>> {
        group_by_status(self.store.issues(), &self.statuses)
    }

    // -----------------------------------------------------------------------
    // Draft workflow
    // -----------------------------------------------------------------------

    /// Stage a new issue. See [`DraftWorkflow::begin`].
    ///
    /// # Errors
    ///
    /// Never for the two built-in roles; creation is open to everyone.
    pub fn begin_draft(&mut self, confirm: &impl Confirm) -> Result<bool> {
        authorize(self.role(), Action::Create, Target::Draft)?;
        Ok(self.draft.begin(&self.store, self.role(), confirm))
    }

    /// Save the pending draft. See [`DraftWorkflow::save`].
    ///
    /// # Errors
    ///
    /// Validation or storage errors; the draft stays pending.
    pub fn save_draft(&mut self) -> Result<Issue> {
        self.draft.save(&mut self.store)
    }

    pub fn discard_draft(&mut self) -> Option<Issue> {
        self.draft.discard()
    }

    // -----------------------------------------------------------------------
    // Issue mutations (draft-aware)
    // -----------------------------------------------------------------------

    /// Patch an issue, or the draft if `id` names it.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Authorization`, or a storage error.
    pub fn update_issue(&mut self, id: &str, patch: &IssuePatch) -> Result<Issue> {
        if self.draft.holds(id) {
            return self.draft.edit(patch, self.store.clock()).cloned();
        }
        self.store.update_issue(self.role(), id, patch)
    }

    /// Move an issue to `status`. Drafts cannot be moved.
    ///
    /// # Errors
    ///
    /// `Authorization(DraftNotMovable)` for the draft, otherwise as
    /// [`IssueStore::move_issue`].
    pub fn move_issue(&mut self, id: &str, status: &str) -> Result<Issue> {
        if self.draft.holds(id) {
            authorize(self.role(), Action::Move, Target::Draft)?;
        }
        self.store.move_issue(self.role(), id, status)
    }

    /// Delete an issue, or discard the draft if `id` names it.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Authorization`, or a storage error. Discarding the draft
    /// never fails.
    pub fn delete_issue(&mut self, id: &str) -> Result<Deleted> {
        if self.draft.holds(id) {
            authorize(self.role(), Action::Delete, Target::Draft)?;
            if let Some(draft) = self.draft.discard() {
                return Ok(Deleted::Draft(draft));
            }
        }
        self.store.remove(self.role(), id).map(Deleted::Issue)
    }

    /// Comment on an issue, or on the draft if `id` names it.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Authorization`, or a storage error.
    pub fn add_comment(&mut self, id: &str, author: &str, body: &str) -> Result<Comment> {
        if self.draft.holds(id) {
            let draft = self.draft.comment(author, body, self.store.clock())?;
            if let Some(comment) = draft.comments.last() {
                return Ok(comment.clone());
            }
        }
        self.store.add_comment(self.role(), id, author, body)
    }

    // -----------------------------------------------------------------------
    // Import, sync, reset, export
    // -----------------------------------------------------------------------

    /// Normalize `text` and append the issues with unseen ids.
    ///
    /// # Errors
    ///
    /// `Parse` for invalid JSON (nothing changes), or a storage error.
    pub fn import_text(&mut self, text: &str) -> Result<MergeReport> {
        let incoming = normalize_text(text, &self.store.clock().now())?;
        self.store.import(incoming)
    }

    /// Normalize an already-parsed document and append the issues with
    /// unseen ids.
    ///
    /// # Errors
    ///
    /// A storage error.
    pub fn import_value(&mut self, value: &Value) -> Result<MergeReport> {
        let incoming = normalize_value(value, &self.store.clock().now());
        self.store.import(incoming)
    }

    /// Re-sync with the baseline, keeping every local record.
    ///
    /// # Errors
    ///
    /// A storage error.
    pub fn resync(&mut self) -> Result<MergeReport> {
        self.store.resync(self.baseline.clone())
    }

    /// Replace the collection with the baseline (maintainer-only, confirmed).
    ///
    /// # Errors
    ///
    /// `Authorization`, `Cancelled`, or a storage error.
    pub fn reset(&mut self, confirm: &impl Confirm) -> Result<()> {
        self.store.replace_all(self.role(), &self.baseline, confirm)
    }

    /// Pretty-printed JSON array of the persisted collection.
    ///
    /// # Errors
    ///
    /// Serialization failure.
    pub fn export_json(&self) -> Result<String> {
        self.store.export_json()
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Present the maintainer secret.
    ///
    /// # Errors
    ///
    /// `Authorization(BadSecret)` or a storage error.
    pub fn sign_in(&mut self, secret: &str, verifier: &impl SecretVerifier) -> Result<Role> {
        self.session.sign_in(secret, verifier, self.store.port_mut())
    }

    /// Return to the guest role.
    ///
    /// # Errors
    ///
    /// A storage error.
    pub fn sign_out(&mut self) -> Result<Role> {
        self.session.sign_out(self.store.port_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthorizationError, SharedSecret};
    use crate::model::time::SteppingClock;
    use crate::storage::MemoryStorage;

    type TestBoard = Board<MemoryStorage, SteppingClock>;

    fn baseline() -> Vec<Issue> {
        let mut a = Issue::blank("ISSUE-1", "2025-01-01T00:00:00.000Z", false);
        a.title = "Seeded".into();
        a.status = "Review".into();
        vec![a]
    }

    fn open() -> TestBoard {
        Board::open(
            MemoryStorage::default(),
            SteppingClock::default(),
            baseline(),
            &["QA".to_string()],
        )
        .unwrap()
    }

    fn yes(_: &str) -> bool {
        true
    }

    #[test]
    fn status_set_includes_baseline_and_configured_statuses() {
        let board = open();
        let names: Vec<&str> = board.statuses().as_slice().iter().map(String::as_str).collect();
        assert_eq!(
            names,
            ["Backlog", "Todo", "In Progress", "Done", "Review", "QA", "Archived"]
        );
        let review = board.columns().into_iter().find(|c| c.status == "Review").unwrap();
        assert_eq!(review.issues.len(), 1);
    }

    #[test]
    fn update_addressed_to_draft_edits_the_draft() {
        let mut board = open();
        board.begin_draft(&yes).unwrap();
        let id = board.draft().pending().unwrap().id.clone();

        let edited = board.update_issue(&id, &IssuePatch::title("draft title")).unwrap();
        assert_eq!(edited.title, "draft title");
        assert!(board.store().get(&id).is_none());
        assert_eq!(board.get(&id).unwrap().title, "draft title");
    }

    #[test]
    fn draft_cannot_be_moved() {
        let mut board = open();
        board.begin_draft(&yes).unwrap();
        let id = board.draft().pending().unwrap().id.clone();
        assert!(matches!(
            board.move_issue(&id, "Done"),
            Err(CorkboardError::Authorization(AuthorizationError::DraftNotMovable))
        ));
    }

    #[test]
    fn deleting_draft_and_issue_are_reported_distinctly() {
        let mut board = open();
        board.begin_draft(&yes).unwrap();
        let id = board.draft().pending().unwrap().id.clone();
        assert!(matches!(board.delete_issue(&id).unwrap(), Deleted::Draft(_)));

        let err = board.delete_issue("ISSUE-1").unwrap_err();
        assert!(matches!(err, CorkboardError::Authorization(_)));

        board.sign_in("s3cret", &SharedSecret::new("s3cret")).unwrap();
        assert!(matches!(board.delete_issue("ISSUE-1").unwrap(), Deleted::Issue(_)));
    }

    #[test]
    fn check_refuses_without_changing_anything() {
        let mut board = open();
        assert!(matches!(
            board.check(Action::Delete, "ISSUE-1"),
            Err(CorkboardError::Authorization(AuthorizationError::NotPermitted { .. }))
        ));
        assert!(matches!(
            board.check(Action::Delete, "ISSUE-404"),
            Err(CorkboardError::NotFound(_))
        ));
        assert_eq!(board.issues().len(), 1);

        board.begin_draft(&yes).unwrap();
        let id = board.draft().pending().unwrap().id.clone();
        board.check(Action::Delete, &id).unwrap();
        assert!(board.check(Action::Move, &id).is_err());

        board.sign_in("s3cret", &SharedSecret::new("s3cret")).unwrap();
        board.check(Action::Delete, "ISSUE-1").unwrap();
    }

    #[test]
    fn guest_draft_is_editable_by_guest_after_save() {
        let mut board = open();
        board.begin_draft(&yes).unwrap();
        let id = board.draft().pending().unwrap().id.clone();
        board.update_issue(&id, &IssuePatch::title("mine")).unwrap();
        board.save_draft().unwrap();

        assert_eq!(board.issues()[0].id, id);
        board.move_issue(&id, "Done").unwrap();
        board.add_comment(&id, "me", "done now").unwrap();
        assert_eq!(board.get(&id).unwrap().comments.len(), 1);
    }

    #[test]
    fn invalid_import_changes_nothing() {
        let mut board = open();
        let before = std::sync::Arc::clone(board.issues());
        assert!(matches!(
            board.import_text("{broken"),
            Err(CorkboardError::Parse(_))
        ));
        assert!(std::sync::Arc::ptr_eq(&before, board.issues()));
    }

    #[test]
    fn import_then_reset_restores_baseline() {
        let mut board = open();
        let report = board
            .import_text(r#"{"bugs": [{"key": "BUG-1", "summary": "imported"}]}"#)
            .unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(board.issues().len(), 2);

        assert!(board.reset(&yes).is_err(), "guests cannot reset");
        board.sign_in("pw", &|s: &str| s == "pw").unwrap();
        board.reset(&yes).unwrap();
        assert_eq!(board.issues().to_vec(), baseline());
    }

    #[test]
    fn role_survives_reopen() {
        let mut board = open();
        board.sign_in("pw", &|s: &str| s == "pw").unwrap();
        let port = board.store().port().clone();
        let reopened = Board::open(port, SteppingClock::default(), baseline(), &[]).unwrap();
        assert_eq!(reopened.role(), Role::Maintainer);
    }

    #[test]
    fn restore_keeps_deleted_baseline_issue_until_resync() {
        let mut board = open();
        board.sign_in("pw", &|s: &str| s == "pw").unwrap();
        board.delete_issue("ISSUE-1").unwrap();
        let port = board.store().port().clone();

        let mut restored = Board::restore(port.clone(), SteppingClock::default(), baseline(), &[]).unwrap();
        assert!(restored.issues().is_empty());

        let reopened = Board::open(port, SteppingClock::default(), baseline(), &[]).unwrap();
        assert_eq!(reopened.issues().len(), 1, "open re-syncs");

        assert_eq!(restored.resync().unwrap().added, 1);
        assert_eq!(restored.get("ISSUE-1").unwrap().title, "Seeded");
    }
}
