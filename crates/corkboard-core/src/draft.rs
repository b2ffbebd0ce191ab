//! Single-slot staging area for a new issue.
//!
//! ```text
//!            begin()                  save() [title non-blank]
//!   Empty ───────────► Pending ──────────────────────────► Empty
//!     ▲                 │   ▲                                (issue prepended
//!     │   discard()     │   │ edit(patch)                     to the store)
//!     └─────────────────┘   └──┘
//! ```
//!
//! A pending draft is never persisted. Its id is reserved from the store's
//! sequence when the draft begins and re-checked when it is saved.

use tracing::{debug, info, warn};

use crate::auth::{Role, provenance_for};
use crate::error::{Result, ValidationError};
use crate::model::{Clock, Issue, IssuePatch};
use crate::storage::StoragePort;
use crate::store::{Confirm, IssueStore, push_comment};

/// Draft slot contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DraftState {
    #[default]
    Empty,
    Pending(Issue),
}

/// Owner of the single draft slot.
#[derive(Debug, Clone, Default)]
pub struct DraftWorkflow {
    state: DraftState,
}

impl DraftWorkflow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &DraftState {
        &self.state
    }

    /// The staged issue, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&Issue> {
        match &self.state {
            DraftState::Pending(issue) => Some(issue),
            DraftState::Empty => None,
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, DraftState::Pending(_))
    }

    /// True when `id` names the pending draft.
    #[must_use]
    pub fn holds(&self, id: &str) -> bool {
        self.pending().is_some_and(|issue| issue.id == id)
    }

    /// Stage a fresh issue created by `role`.
    ///
    /// When a draft is already pending, `confirm` decides whether to discard
    /// it. Returns `false` (and changes nothing) if the user declines.
    pub fn begin<P: StoragePort, C: Clock>(
        &mut self,
        store: &IssueStore<P, C>,
        role: Role,
        confirm: &impl Confirm,
    ) -> bool {
        if let Some(existing) = self.pending() {
            if !confirm.confirm("Discard the unsaved draft and start a new issue?") {
                debug!(id = %existing.id, "kept existing draft");
                return false;
            }
            debug!(id = %existing.id, "discarding draft to begin a new one");
        }

        let now = store.clock().now();
        let issue = Issue::blank(store.next_id(), &now, provenance_for(role));
        info!(id = %issue.id, %role, "draft started");
        self.state = DraftState::Pending(issue);
        true
    }

    /// Apply `patch` to the staged issue only.
    ///
    /// # Errors
    ///
    /// [`ValidationError::NoDraft`] when nothing is pending.
    pub fn edit(&mut self, patch: &IssuePatch, clock: &impl Clock) -> Result<&Issue> {
        match &mut self.state {
            DraftState::Pending(issue) => {
                issue.apply(patch, &clock.now());
                Ok(issue)
            }
            DraftState::Empty => Err(ValidationError::NoDraft.into()),
        }
    }

    /// Attach a comment to the staged issue.
    ///
    /// # Errors
    ///
    /// [`ValidationError::NoDraft`] when nothing is pending.
    pub fn comment(&mut self, author: &str, body: &str, clock: &impl Clock) -> Result<&Issue> {
        match &mut self.state {
            DraftState::Pending(issue) => {
                push_comment(issue, author, body, &clock.now());
                Ok(issue)
            }
            DraftState::Empty => Err(ValidationError::NoDraft.into()),
        }
    }

    /// Persist the staged issue at the front of `store`.
    ///
    /// If the reserved id has been taken since the draft began (an import
    /// landed in between), the draft is re-keyed with the store's next id.
    ///
    /// # Errors
    ///
    /// [`ValidationError::EmptyTitle`] for a blank title, [`ValidationError::NoDraft`]
    /// when nothing is pending, or a storage error. The draft stays pending
    /// on every error.
    pub fn save<P: StoragePort, C: Clock>(&mut self, store: &mut IssueStore<P, C>) -> Result<Issue> {
        let DraftState::Pending(staged) = &self.state else {
            return Err(ValidationError::NoDraft.into());
        };
        if staged.has_blank_title() {
            warn!(id = %staged.id, "draft save rejected: empty title");
            return Err(ValidationError::EmptyTitle.into());
        }

        let mut issue = staged.clone();
        if store.contains(&issue.id) {
            let fresh = store.next_id();
            warn!(reserved = %issue.id, %fresh, "draft id taken meanwhile, re-keying");
            issue.id = fresh;
        }

        store.prepend(issue.clone())?;
        self.state = DraftState::Empty;
        Ok(issue)
    }

    /// Drop the staged issue without persisting it. Returns it, if any.
    pub fn discard(&mut self) -> Option<Issue> {
        match std::mem::take(&mut self.state) {
            DraftState::Pending(issue) => {
                info!(id = %issue.id, "draft discarded");
                Some(issue)
            }
            DraftState::Empty => None,
        }
    }
}
