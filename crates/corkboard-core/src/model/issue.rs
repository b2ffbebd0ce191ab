use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Fixed priority ladder. `P0` is the most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::P0, Self::P1, Self::P2, Self::P3];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a priority from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePriorityError {
    pub got: String,
}

impl fmt::Display for ParsePriorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid priority: '{}' (expected P0..P3)", self.got)
    }
}

impl std::error::Error for ParsePriorityError {}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    /// Accepts `P0`..`P3` in any case, and the bare digits `0`..`3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('p')
            .or_else(|| trimmed.strip_prefix('P'))
            .unwrap_or(trimmed);
        match digits {
            "0" => Ok(Self::P0),
            "1" => Ok(Self::P1),
            "2" => Ok(Self::P2),
            "3" => Ok(Self::P3),
            _ => Err(ParsePriorityError { got: s.to_string() }),
        }
    }
}

/// A remark attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
    pub created_at: String,
}

/// The unit of tracked work shown as one card on the board.
///
/// `status` is stored verbatim; values outside the known status set are
/// only remapped when grouping for display (see [`crate::model::status`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub created_by_visitor: bool,
}

impl Issue {
    /// A blank issue stamped with `now`, as staged by a new draft.
    #[must_use]
    pub fn blank(id: impl Into<String>, now: &str, created_by_visitor: bool) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            status: crate::model::status::BACKLOG.to_string(),
            priority: None,
            assignee: String::new(),
            tags: Vec::new(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
            comments: Vec::new(),
            created_by_visitor,
        }
    }

    /// Apply `patch` and stamp `updated_at`.
    ///
    /// `id`, `created_at`, `comments` and `created_by_visitor` are never
    /// touched by a patch.
    pub fn apply(&mut self, patch: &IssuePatch, now: &str) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(status) = &patch.status {
            self.status.clone_from(status);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assignee) = &patch.assignee {
            self.assignee.clone_from(assignee);
        }
        if let Some(tags) = &patch.tags {
            self.tags.clone_from(tags);
        }
        self.updated_at = now.to_string();
    }

    /// Returns true when `title` is empty after trimming.
    #[must_use]
    pub fn has_blank_title(&self) -> bool {
        self.title.trim().is_empty()
    }
}

/// Field-level replacement for an issue. `None` leaves a field alone.
///
/// `priority` is doubly optional: `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<Option<Priority>>,
    pub assignee: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl IssuePatch {
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }

    /// True when the patch would change nothing but `updated_at`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assignee.is_none()
            && self.tags.is_none()
    }
}
