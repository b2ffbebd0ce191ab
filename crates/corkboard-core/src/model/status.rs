//! Board columns and status bucketing.
//!
//! The status set is an ordered list of column names. It always starts from
//! the canonical workflow and always ends with the terminal status, so
//! archived cards stay in the last column no matter how many custom
//! statuses a dataset introduces.

use crate::model::issue::Issue;

pub const BACKLOG: &str = "Backlog";
pub const TODO: &str = "Todo";
pub const IN_PROGRESS: &str = "In Progress";
pub const DONE: &str = "Done";
pub const ARCHIVED: &str = "Archived";

/// Canonical column order.
pub const CANONICAL: [&str; 5] = [BACKLOG, TODO, IN_PROGRESS, DONE, ARCHIVED];

/// Ordered set of known statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSet {
    names: Vec<String>,
}

impl Default for StatusSet {
    fn default() -> Self {
        Self::canonical()
    }
}

impl StatusSet {
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            names: CANONICAL.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Insert `status` immediately before the terminal status.
    ///
    /// Empty names and names already present are ignored.
    pub fn insert(&mut self, status: &str) {
        if status.is_empty() || self.contains(status) {
            return;
        }
        let at = self.names.len().saturating_sub(1);
        self.names.insert(at, status.to_string());
    }

    /// Canonical set extended with every status observed on `issues`.
    #[must_use]
    pub fn observed_in<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut set = Self::canonical();
        set.extend(issues.into_iter().map(|issue| issue.status.as_str()));
        set
    }

    pub fn extend<'a>(&mut self, statuses: impl IntoIterator<Item = &'a str>) {
        for status in statuses {
            self.insert(status);
        }
    }

    #[must_use]
    pub fn contains(&self, status: &str) -> bool {
        self.names.iter().any(|name| name == status)
    }

    /// The column an issue with `status` is displayed under.
    ///
    /// Unknown or empty statuses fall back to `Backlog`.
    #[must_use]
    pub fn bucket_for<'a>(&'a self, status: &'a str) -> &'a str {
        if self.contains(status) { status } else { BACKLOG }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    /// The last column.
    #[must_use]
    pub fn terminal(&self) -> &str {
        self.names.last().map_or(ARCHIVED, String::as_str)
    }
}

/// One board column with the issues displayed in it, in collection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column<'a> {
    pub status: &'a str,
    pub issues: Vec<&'a Issue>,
}

/// Group `issues` into one column per status, in set order.
///
/// Stored statuses are never rewritten; only the display bucket changes.
#[must_use]
pub fn group_by_status<'a>(issues: &'a [Issue], statuses: &'a StatusSet) -> Vec<Column<'a>> {
    let mut columns: Vec<Column<'a>> = statuses
        .as_slice()
        .iter()
        .map(|status| Column {
            status: status.as_str(),
            issues: Vec::new(),
        })
        .collect();

    for issue in issues {
        let bucket = statuses.bucket_for(&issue.status);
        if let Some(column) = columns.iter_mut().find(|c| c.status == bucket) {
            column.issues.push(issue);
        }
    }
    columns
}
