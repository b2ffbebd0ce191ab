pub mod issue;
pub mod status;
pub mod time;

pub use issue::{Comment, Issue, IssuePatch, Priority};
pub use status::{Column, StatusSet, group_by_status};
pub use time::{Clock, SystemClock};

use std::sync::Arc;

/// An immutable snapshot of the persisted collection.
///
/// Operations never mutate a snapshot; they build a new one. Two snapshots
/// that are pointer-equal (`Arc::ptr_eq`) are guaranteed identical, which
/// lets callers skip redraws and saves cheaply.
pub type Issues = Arc<[Issue]>;
