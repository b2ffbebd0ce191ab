//! Shape-flexible issue ingestion.
//!
//! External documents arrive in many shapes: a bare array, or an object
//! wrapping the array under `issues`, `items` or `bugs`; records name their
//! fields `title` or `summary`, `labels` or `tags`, and so on. This module
//! turns any of them into schema-complete [`Issue`] records.
//!
//! # Field resolution
//!
//! Each field has an ordered table of candidate source keys and one
//! extraction rule. The first candidate whose value is present and not
//! `null` is selected, then the rule converts it; when no candidate
//! matches, the field's default applies. A selected value the rule cannot
//! convert (for example `"priority": "high"`) yields the default rather
//! than falling through to later candidates.
//!
//! | Field              | Candidates                  | Default            |
//! |--------------------|-----------------------------|--------------------|
//! | `id`               | `id`, `key`                 | `ISSUE-{i+1}`      |
//! | `title`            | `title`, `summary`, `name`  | `Untitled`         |
//! | `description`      | `description`, `body`       | empty              |
//! | `status`           | `status`, `state`           | `Backlog`          |
//! | `priority`         | `priority`, `severity`      | absent             |
//! | `tags`             | `tags`, `labels`            | empty              |
//! | `assignee`         | `assignee`, `owner`         | empty              |
//! | `createdAt`        | `createdAt`, `created`      | now                |
//! | `updatedAt`        | `updatedAt`, `updated`      | resolved createdAt |
//! | `comments`         | `comments`                  | empty              |
//! | `createdByVisitor` | `createdByVisitor`          | `false`            |
//!
//! Normalization has no side effects. It reads the clock only to default
//! missing timestamps, and draws randomness only for missing comment ids.

use rand::{Rng, distributions::Alphanumeric};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::model::issue::{Comment, Issue, Priority};
use crate::model::status::BACKLOG;
use crate::model::time::Clock;

/// Top-level fields that may wrap the record array, in lookup order.
pub const COLLECTION_KEYS: [&str; 3] = ["issues", "items", "bugs"];

const UNTITLED: &str = "Untitled";
const COMMENT_ID_PREFIX: &str = "c-";
const COMMENT_ID_LEN: usize = 10;

// ---------------------------------------------------------------------------
// Field tables
// ---------------------------------------------------------------------------

/// Ordered candidate keys plus the rule that converts the selected value.
struct Field<T> {
    keys: &'static [&'static str],
    extract: fn(&Value) -> Option<T>,
}

impl<T> Field<T> {
    /// First non-null candidate, converted by the field's rule.
    fn resolve(&self, record: &Value) -> Option<T> {
        self.keys
            .iter()
            .find_map(|key| record.get(key).filter(|value| !value.is_null()))
            .and_then(self.extract)
    }
}

const ID: Field<String> = Field {
    keys: &["id", "key"],
    extract: coerce_text,
};
const TITLE: Field<String> = Field {
    keys: &["title", "summary", "name"],
    extract: coerce_text,
};
const DESCRIPTION: Field<String> = Field {
    keys: &["description", "body"],
    extract: coerce_text,
};
const STATUS: Field<String> = Field {
    keys: &["status", "state"],
    extract: coerce_text,
};
const PRIORITY: Field<Priority> = Field {
    keys: &["priority", "severity"],
    extract: coerce_priority,
};
const TAGS: Field<Vec<String>> = Field {
    keys: &["tags", "labels"],
    extract: coerce_tags,
};
const ASSIGNEE: Field<String> = Field {
    keys: &["assignee", "owner"],
    extract: coerce_text,
};
const CREATED_AT: Field<String> = Field {
    keys: &["createdAt", "created"],
    extract: coerce_text,
};
const UPDATED_AT: Field<String> = Field {
    keys: &["updatedAt", "updated"],
    extract: coerce_text,
};
const COMMENTS: Field<Vec<Value>> = Field {
    keys: &["comments"],
    extract: coerce_array,
};
const CREATED_BY_VISITOR: Field<bool> = Field {
    keys: &["createdByVisitor"],
    extract: Value::as_bool,
};

const COMMENT_ID: Field<String> = Field {
    keys: &["id"],
    extract: coerce_text,
};
const COMMENT_AUTHOR: Field<String> = Field {
    keys: &["author", "user"],
    extract: coerce_text,
};
const COMMENT_BODY: Field<String> = Field {
    keys: &["body", "text"],
    extract: coerce_text,
};
const COMMENT_CREATED_AT: Field<String> = Field {
    keys: &["createdAt", "created"],
    extract: coerce_text,
};

// ---------------------------------------------------------------------------
// Extraction rules
// ---------------------------------------------------------------------------

/// Render a scalar as text. Numbers keep their JSON spelling; composite
/// values become compact JSON.
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

fn coerce_priority(value: &Value) -> Option<Priority> {
    let parsed = match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    };
    if parsed.is_none() {
        debug!(%value, "unrecognized priority treated as absent");
    }
    parsed
}

/// Comma-separated strings are split and trimmed; arrays are kept in order
/// with duplicates; anything else is empty.
fn coerce_tags(value: &Value) -> Option<Vec<String>> {
    let tags = match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items.iter().filter_map(coerce_text).collect(),
        _ => Vec::new(),
    };
    Some(tags)
}

fn coerce_array(value: &Value) -> Option<Vec<Value>> {
    Some(value.as_array().cloned().unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Raw text or an already-parsed document.
#[derive(Debug, Clone, Copy)]
pub enum NormalizeInput<'a> {
    Text(&'a str),
    Value(&'a Value),
}

impl<'a> From<&'a str> for NormalizeInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a Value> for NormalizeInput<'a> {
    fn from(value: &'a Value) -> Self {
        Self::Value(value)
    }
}

/// Normalize text or a parsed value, defaulting timestamps from `clock`.
///
/// # Errors
///
/// Returns [`crate::CorkboardError::Parse`] when text input is not valid
/// JSON.
pub fn normalize<'a>(input: impl Into<NormalizeInput<'a>>, clock: &impl Clock) -> Result<Vec<Issue>> {
    let now = clock.now();
    match input.into() {
        NormalizeInput::Text(text) => normalize_text(text, &now),
        NormalizeInput::Value(value) => Ok(normalize_value(value, &now)),
    }
}

/// Parse `text` as JSON and normalize it.
///
/// # Errors
///
/// Returns [`crate::CorkboardError::Parse`] when `text` is not valid JSON.
pub fn normalize_text(text: &str, now: &str) -> Result<Vec<Issue>> {
    let value: Value = serde_json::from_str(text)?;
    Ok(normalize_value(&value, now))
}

/// Normalize an already-parsed document. Unrecognized shapes yield no issues.
#[must_use]
pub fn normalize_value(value: &Value, now: &str) -> Vec<Issue> {
    let records = locate_records(value);
    debug!(count = records.len(), "normalizing issue records");
    records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_record(record, index, now))
        .collect()
}

/// Find the record array: the value itself, else `issues`, `items`, `bugs`.
#[must_use]
pub fn locate_records(value: &Value) -> &[Value] {
    if let Value::Array(records) = value {
        return records;
    }
    COLLECTION_KEYS
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Normalize one raw record found at 0-based `index`.
#[must_use]
pub fn normalize_record(record: &Value, index: usize, now: &str) -> Issue {
    let created_at = CREATED_AT
        .resolve(record)
        .unwrap_or_else(|| now.to_string());
    let updated_at = UPDATED_AT
        .resolve(record)
        .unwrap_or_else(|| created_at.clone());

    let mut comments: Vec<Comment> = Vec::new();
    for raw in COMMENTS.resolve(record).unwrap_or_default() {
        let comment = normalize_comment(&raw, now, &comments);
        comments.push(comment);
    }

    Issue {
        id: ID
            .resolve(record)
            .unwrap_or_else(|| format!("ISSUE-{}", index + 1)),
        title: TITLE.resolve(record).unwrap_or_else(|| UNTITLED.to_string()),
        description: DESCRIPTION.resolve(record).unwrap_or_default(),
        status: STATUS.resolve(record).unwrap_or_else(|| BACKLOG.to_string()),
        priority: PRIORITY.resolve(record),
        assignee: ASSIGNEE.resolve(record).unwrap_or_default(),
        tags: TAGS.resolve(record).unwrap_or_default(),
        created_at,
        updated_at,
        comments,
        created_by_visitor: CREATED_BY_VISITOR.resolve(record).unwrap_or(false),
    }
}

/// Normalize one raw comment. `siblings` are the comments already accepted
/// for the same issue, so a generated id never collides with them.
fn normalize_comment(raw: &Value, now: &str, siblings: &[Comment]) -> Comment {
    let id = COMMENT_ID
        .resolve(raw)
        .unwrap_or_else(|| fresh_comment_id(siblings));
    let body = COMMENT_BODY.resolve(raw).unwrap_or_else(|| match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });

    Comment {
        id,
        author: COMMENT_AUTHOR.resolve(raw).unwrap_or_default(),
        body,
        created_at: COMMENT_CREATED_AT
            .resolve(raw)
            .unwrap_or_else(|| now.to_string()),
    }
}

/// Random comment id unique among `siblings`.
#[must_use]
pub fn fresh_comment_id(siblings: &[Comment]) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let suffix: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(COMMENT_ID_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        let id = format!("{COMMENT_ID_PREFIX}{suffix}");
        if siblings.iter().all(|c| c.id != id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::time::SteppingClock;
    use serde_json::json;

    const NOW: &str = "2026-05-01T12:00:00.000Z";

    #[test]
    fn bare_array_and_wrappers_normalize_identically() {
        let records = json!([
            {"id": "A-1", "title": "First"},
            {"summary": "Second", "labels": "ui, backend"}
        ]);
        let bare = normalize_value(&records, NOW);
        for key in COLLECTION_KEYS {
            let mut wrapper = serde_json::Map::new();
            wrapper.insert(key.to_string(), records.clone());
            let wrapped = Value::Object(wrapper);
            assert_eq!(normalize_value(&wrapped, NOW), bare, "wrapper {key}");
        }
        assert_eq!(bare.len(), 2);
    }

    #[test]
    fn wrapper_lookup_order_is_issues_items_bugs() {
        let doc = json!({
            "bugs": [{"title": "from bugs"}],
            "items": [{"title": "from items"}],
        });
        let issues = normalize_value(&doc, NOW);
        assert_eq!(issues[0].title, "from items");
    }

    #[test]
    fn non_array_wrapper_falls_through() {
        let doc = json!({"issues": "nope", "bugs": [{"title": "b"}]});
        let issues = normalize_value(&doc, NOW);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].title, "b");
    }

    #[test]
    fn unrecognized_shapes_yield_nothing() {
        for doc in [json!({"tickets": []}), json!(42), json!("text"), json!(null)] {
            assert!(normalize_value(&doc, NOW).is_empty(), "{doc}");
        }
    }

    #[test]
    fn missing_ids_use_one_based_position() {
        let doc = json!([{"title": "a"}, {"id": "X"}, {"title": "c"}]);
        let ids: Vec<String> = normalize_value(&doc, NOW)
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, ["ISSUE-1", "X", "ISSUE-3"]);
    }

    #[test]
    fn defaults_fill_every_field() {
        let issue = normalize_record(&json!({}), 0, NOW);
        assert_eq!(issue.id, "ISSUE-1");
        assert_eq!(issue.title, "Untitled");
        assert_eq!(issue.status, "Backlog");
        assert_eq!(issue.description, "");
        assert_eq!(issue.assignee, "");
        assert!(issue.priority.is_none());
        assert!(issue.tags.is_empty());
        assert!(issue.comments.is_empty());
        assert_eq!(issue.created_at, NOW);
        assert_eq!(issue.updated_at, NOW);
        assert!(!issue.created_by_visitor);
    }

    #[test]
    fn alias_keys_are_used_in_order() {
        let record = json!({
            "key": "JIRA-7",
            "summary": "From summary",
            "name": "From name",
            "state": "Done",
            "severity": "p2",
            "owner": "dana",
            "created": "2025-01-01T00:00:00.000Z",
            "updated": "2025-01-02T00:00:00.000Z"
        });
        let issue = normalize_record(&record, 0, NOW);
        assert_eq!(issue.id, "JIRA-7");
        assert_eq!(issue.title, "From summary");
        assert_eq!(issue.status, "Done");
        assert_eq!(issue.priority, Some(Priority::P2));
        assert_eq!(issue.assignee, "dana");
        assert_eq!(issue.created_at, "2025-01-01T00:00:00.000Z");
        assert_eq!(issue.updated_at, "2025-01-02T00:00:00.000Z");
    }

    #[test]
    fn null_candidates_are_skipped() {
        let record = json!({"title": null, "summary": "Fallback", "id": null, "key": 9});
        let issue = normalize_record(&record, 4, NOW);
        assert_eq!(issue.title, "Fallback");
        assert_eq!(issue.id, "9");
    }

    #[test]
    fn numeric_values_are_coerced_to_strings() {
        let record = json!({"id": 42, "title": 7, "assignee": true});
        let issue = normalize_record(&record, 0, NOW);
        assert_eq!(issue.id, "42");
        assert_eq!(issue.title, "7");
        assert_eq!(issue.assignee, "true");
    }

    #[test]
    fn updated_at_defaults_to_resolved_created_at() {
        let record = json!({"createdAt": "2024-06-01T00:00:00.000Z"});
        let issue = normalize_record(&record, 0, NOW);
        assert_eq!(issue.updated_at, "2024-06-01T00:00:00.000Z");
    }

    #[test]
    fn tags_from_strings_arrays_and_junk() {
        let split = normalize_record(&json!({"tags": " ui ,api,, ui "}), 0, NOW);
        assert_eq!(split.tags, ["ui", "api", "ui"]);

        let array = normalize_record(&json!({"labels": ["b", "a", "b", 3, null]}), 0, NOW);
        assert_eq!(array.tags, ["b", "a", "b", "3"]);

        let junk = normalize_record(&json!({"tags": {"x": 1}, "labels": ["ignored"]}), 0, NOW);
        assert!(junk.tags.is_empty(), "first non-null candidate wins even if unusable");
    }

    #[test]
    fn unknown_priority_is_absent() {
        let issue = normalize_record(&json!({"priority": "high", "severity": "P1"}), 0, NOW);
        assert!(issue.priority.is_none());
        let numeric = normalize_record(&json!({"priority": 3}), 0, NOW);
        assert_eq!(numeric.priority, Some(Priority::P3));
    }

    #[test]
    fn comments_are_normalized_with_aliases() {
        let record = json!({
            "comments": [
                {"id": 5, "user": "ana", "text": "looks good", "created": "2025-01-01"},
                {"author": "bo", "body": "needs work"},
                "plain remark",
                {"reaction": "+1"}
            ]
        });
        let issue = normalize_record(&record, 0, NOW);
        let comments = &issue.comments;
        assert_eq!(comments.len(), 4);

        assert_eq!(comments[0].id, "5");
        assert_eq!(comments[0].author, "ana");
        assert_eq!(comments[0].body, "looks good");
        assert_eq!(comments[0].created_at, "2025-01-01");

        assert!(comments[1].id.starts_with("c-"));
        assert_eq!(comments[1].created_at, NOW);

        assert_eq!(comments[2].body, "plain remark");
        assert_eq!(comments[3].body, r#"{"reaction":"+1"}"#);

        assert_ne!(comments[1].id, comments[2].id);
    }

    #[test]
    fn non_array_comments_are_empty() {
        let issue = normalize_record(&json!({"comments": "n/a"}), 0, NOW);
        assert!(issue.comments.is_empty());
    }

    #[test]
    fn provenance_flag_is_read_when_boolean() {
        let visitor = normalize_record(&json!({"createdByVisitor": true}), 0, NOW);
        assert!(visitor.created_by_visitor);
        let junk = normalize_record(&json!({"createdByVisitor": "yes"}), 0, NOW);
        assert!(!junk.created_by_visitor);
    }

    #[test]
    fn invalid_text_is_a_parse_error() {
        let err = normalize_text("[{\"title\": ", NOW).unwrap_err();
        assert!(matches!(err, crate::CorkboardError::Parse(_)));
    }

    #[test]
    fn normalize_accepts_text_or_value() {
        let clock = SteppingClock::default();
        let from_text = normalize("{\"bugs\": [{\"title\": \"t\"}]}", &clock).unwrap();
        let value = json!({"bugs": [{"title": "t"}]});
        let from_value = normalize(&value, &clock).unwrap();
        assert_eq!(from_text[0].title, from_value[0].title);
        assert_eq!(from_text[0].id, "ISSUE-1");
    }

    #[test]
    fn normalizing_normalized_output_is_a_fixed_point() {
        let doc = json!({"issues": [{
            "id": "ISSUE-1",
            "title": "Crash",
            "description": "on start",
            "status": "Todo",
            "priority": "P1",
            "assignee": "kim",
            "tags": ["a", "a", "b"],
            "createdAt": "2025-01-01T00:00:00.000Z",
            "updatedAt": "2025-01-03T00:00:00.000Z",
            "comments": [{"author": "kim", "body": "repro attached"}],
            "createdByVisitor": true
        }]});
        let once = normalize_value(&doc, NOW);
        let reserialized = serde_json::to_value(&once).unwrap();
        let twice = normalize_value(&reserialized, "2030-01-01T00:00:00.000Z");
        assert_eq!(once, twice);
    }
}
