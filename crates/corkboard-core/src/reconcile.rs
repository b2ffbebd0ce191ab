//! Merge policies for bringing normalized issues into the local collection.
//!
//! Both policies are pure: they take the current snapshot and an incoming
//! batch and return a new snapshot, leaving the input untouched.
//!
//! - [`merge_local_wins`] re-syncs with the baseline dataset. On an id match
//!   the local record is kept exactly as it is, so edits made on this board
//!   always survive a baseline refresh.
//! - [`merge_append_new`] is used for user imports (file, paste, URL). It
//!   only ever adds issues with unseen ids and never overwrites, because
//!   imported payloads are less trusted than in-app edits.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::model::{Issue, Issues};

/// Counts describing what a merge did, for status lines and logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MergeReport {
    /// Incoming issues appended to the collection.
    pub added: usize,
    /// Incoming issues whose id already existed; the local copy was kept.
    pub kept_local: usize,
    /// Incoming issues discarded because their id repeated within the batch.
    pub dropped: usize,
}

impl MergeReport {
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.added == 0
    }
}

/// Local-wins merge, see [`merge_local_wins_with_report`].
#[must_use]
pub fn merge_local_wins(existing: &Issues, incoming: Vec<Issue>) -> Issues {
    merge_local_wins_with_report(existing, incoming).0
}

/// Baseline re-sync.
///
/// Existing issues keep their position and content. An incoming issue with
/// a known id contributes nothing: the local record shadows every field.
/// Incoming issues with new ids are appended in batch order.
#[must_use]
pub fn merge_local_wins_with_report(existing: &Issues, incoming: Vec<Issue>) -> (Issues, MergeReport) {
    let (appended, report) = split_new(existing, incoming);
    info!(
        added = report.added,
        kept_local = report.kept_local,
        "local-wins merge"
    );
    (extend(existing, appended), report)
}

/// Append-only merge, see [`merge_append_new_with_report`].
#[must_use]
pub fn merge_append_new(existing: &Issues, incoming: Vec<Issue>) -> Issues {
    merge_append_new_with_report(existing, incoming).0
}

/// User import.
///
/// Issues with unseen ids are appended; issues whose id already exists are
/// silently dropped. When nothing is new the returned snapshot is the same
/// `Arc` as `existing`, so `Arc::ptr_eq` detects the no-op.
#[must_use]
pub fn merge_append_new_with_report(existing: &Issues, incoming: Vec<Issue>) -> (Issues, MergeReport) {
    let (appended, report) = split_new(existing, incoming);
    info!(
        added = report.added,
        skipped = report.kept_local + report.dropped,
        "append-only import"
    );
    (extend(existing, appended), report)
}

/// Partition `incoming` into issues with ids unseen locally (first
/// occurrence within the batch wins) and a report of the rest.
fn split_new(existing: &[Issue], incoming: Vec<Issue>) -> (Vec<Issue>, MergeReport) {
    let local: HashSet<&str> = existing.iter().map(|issue| issue.id.as_str()).collect();
    let mut seen_in_batch: HashSet<String> = HashSet::new();
    let mut report = MergeReport::default();
    let mut appended = Vec::new();

    for issue in incoming {
        if local.contains(issue.id.as_str()) {
            debug!(id = %issue.id, "id already present locally, keeping local copy");
            report.kept_local += 1;
        } else if !seen_in_batch.insert(issue.id.clone()) {
            debug!(id = %issue.id, "duplicate id within incoming batch dropped");
            report.dropped += 1;
        } else {
            appended.push(issue);
        }
    }

    report.added = appended.len();
    (appended, report)
}

fn extend(existing: &Issues, appended: Vec<Issue>) -> Issues {
    if appended.is_empty() {
        return Arc::clone(existing);
    }
    existing.iter().cloned().chain(appended).collect()
}
