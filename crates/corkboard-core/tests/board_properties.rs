//! Behavioral properties of the board core, exercised through the public API.

use std::sync::Arc;

use corkboard_core::auth::{AuthorizationError, Role, SharedSecret};
use corkboard_core::model::time::SteppingClock;
use corkboard_core::model::{StatusSet, group_by_status};
use corkboard_core::normalize::normalize_text;
use corkboard_core::reconcile::{merge_append_new, merge_local_wins};
use corkboard_core::store::next_issue_id;
use corkboard_core::{
    Board, CorkboardError, Deleted, Issue, IssuePatch, IssueStore, Issues, MemoryStorage,
};
use serde_json::json;

const NOW: &str = "2026-05-01T12:00:00.000Z";

fn issue(id: &str, title: &str, by_visitor: bool) -> Issue {
    let mut issue = Issue::blank(id, NOW, by_visitor);
    issue.title = title.to_string();
    issue
}

fn yes(_: &str) -> bool {
    true
}

fn no(_: &str) -> bool {
    false
}

fn board_with(issues: Vec<Issue>) -> Board<MemoryStorage, SteppingClock> {
    Board::open(MemoryStorage::default(), SteppingClock::default(), issues, &[])
        .expect("open board")
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

#[test]
fn every_collection_wrapper_yields_the_same_issues() {
    let records = json!([
        {"key": "BUG-7", "summary": "first", "labels": "a, b", "severity": 1},
        {"title": "second", "state": "Done", "owner": "kim"}
    ]);
    let bare = normalize_text(&records.to_string(), NOW).unwrap();
    for wrapper in ["bugs", "items", "issues"] {
        let mut wrapped = serde_json::Map::new();
        wrapped.insert(wrapper.to_string(), records.clone());
        let wrapped = serde_json::Value::Object(wrapped);
        assert_eq!(
            normalize_text(&wrapped.to_string(), NOW).unwrap(),
            bare,
            "wrapper {wrapper}"
        );
    }
}

#[test]
fn missing_ids_use_one_based_position() {
    let text = r#"[{"id": "KEEP"}, {"title": "no id"}, {"title": "also none"}]"#;
    let ids: Vec<String> = normalize_text(text, NOW)
        .unwrap()
        .into_iter()
        .map(|issue| issue.id)
        .collect();
    assert_eq!(ids, ["KEEP", "ISSUE-2", "ISSUE-3"]);
}

#[test]
fn unrecognized_shapes_yield_nothing() {
    for text in [r#"{"records": []}"#, "42", r#""text""#, "null"] {
        assert!(normalize_text(text, NOW).unwrap().is_empty(), "{text}");
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

#[test]
fn local_wins_keeps_the_local_title() {
    let local: Issues = vec![issue("A", "X", false)].into();
    let merged = merge_local_wins(&local, vec![issue("A", "Y", false)]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].title, "X");
}

#[test]
fn append_only_adds_new_and_leaves_known_ids_alone() {
    let local: Issues = vec![issue("A", "", false)].into();
    let merged = merge_append_new(&local, vec![issue("A", "Z", false), issue("B", "", false)]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0], local[0]);
    assert_eq!(merged[1].id, "B");
}

#[test]
fn importing_twice_adds_no_duplicates() {
    let mut board = board_with(Vec::new());
    let payload = r#"{"items": [{"id": "I-1"}, {"id": "I-2"}]}"#;

    assert_eq!(board.import_text(payload).unwrap().added, 2);
    let after_first = Arc::clone(board.issues());

    let second = board.import_text(payload).unwrap();
    assert!(second.is_noop());
    assert!(Arc::ptr_eq(&after_first, board.issues()));
}

// ---------------------------------------------------------------------------
// Ids, authorization, drafts
// ---------------------------------------------------------------------------

#[test]
fn next_id_skips_ids_without_numeric_suffix() {
    assert_eq!(next_issue_id(["ISSUE-3", "ISSUE-1", "imported", "X-y"]), "ISSUE-4");
}

#[test]
fn next_id_ignores_foreign_numbered_ids() {
    assert_eq!(next_issue_id(["ISSUE-3", "ISSUE-1", "X-9"]), "ISSUE-4");
}

#[test]
fn deletion_follows_role_and_provenance() {
    let mut board = board_with(vec![
        issue("ISSUE-1", "seeded", false),
        issue("ISSUE-2", "visitor", true),
    ]);

    assert!(matches!(
        board.delete_issue("ISSUE-1"),
        Err(CorkboardError::Authorization(AuthorizationError::NotPermitted { .. }))
    ));
    assert!(matches!(board.delete_issue("ISSUE-2"), Ok(Deleted::Issue(_))));

    board
        .sign_in("open sesame", &SharedSecret::new("open sesame"))
        .unwrap();
    assert!(matches!(board.delete_issue("ISSUE-1"), Ok(Deleted::Issue(_))));
    assert!(board.issues().is_empty());
}

#[test]
fn draft_save_prepends_exactly_one_issue() {
    let mut board = board_with(vec![issue("ISSUE-1", "seeded", false)]);
    assert!(board.begin_draft(&yes).unwrap());
    let id = board.draft().pending().unwrap().id.clone();
    board.update_issue(&id, &IssuePatch::title("new work")).unwrap();

    let saved = board.save_draft().unwrap();
    assert_eq!(board.issues().len(), 2);
    assert_eq!(board.issues()[0], saved);
    assert!(!board.draft().is_pending());
}

#[test]
fn draft_save_with_empty_title_changes_nothing() {
    let mut board = board_with(vec![issue("ISSUE-1", "seeded", false)]);
    board.begin_draft(&yes).unwrap();
    let before = Arc::clone(board.issues());

    assert!(matches!(
        board.save_draft(),
        Err(CorkboardError::Validation(_))
    ));
    assert!(Arc::ptr_eq(&before, board.issues()));
    assert!(board.draft().is_pending());
}

// ---------------------------------------------------------------------------
// Status bucketing
// ---------------------------------------------------------------------------

#[test]
fn unknown_status_is_shown_in_backlog_but_stored_verbatim() {
    let mut odd = issue("ISSUE-1", "odd", false);
    odd.status = "Unknown".into();
    let issues = vec![odd];

    let statuses = StatusSet::canonical();
    let columns = group_by_status(&issues, &statuses);
    let backlog = columns.iter().find(|c| c.status == "Backlog").unwrap();
    assert_eq!(backlog.issues.len(), 1);
    assert_eq!(backlog.issues[0].status, "Unknown");
}

// ---------------------------------------------------------------------------
// Transactionality
// ---------------------------------------------------------------------------

#[test]
fn failed_save_leaves_store_unchanged() {
    let mut port = MemoryStorage::default();
    port.fail_saves(true);
    let mut store = IssueStore::from_parts(
        port,
        SteppingClock::default(),
        vec![issue("ISSUE-1", "t", true)],
    );
    let before = Arc::clone(store.issues());

    assert!(matches!(
        store.update_issue(Role::Guest, "ISSUE-1", &IssuePatch::title("changed")),
        Err(CorkboardError::Storage(_))
    ));
    assert!(Arc::ptr_eq(&before, store.issues()));
    assert_eq!(store.issues()[0].title, "t");
}

#[test]
fn declined_confirmations_change_nothing() {
    let mut board = board_with(vec![issue("ISSUE-1", "seeded", false)]);
    board.sign_in("pw", &|s: &str| s == "pw").unwrap();
    board.import_text(r#"[{"id": "EXTRA"}]"#).unwrap();
    let before = Arc::clone(board.issues());

    assert!(matches!(board.reset(&no), Err(CorkboardError::Cancelled(_))));
    assert!(Arc::ptr_eq(&before, board.issues()));

    board.begin_draft(&yes).unwrap();
    let id = board.draft().pending().unwrap().id.clone();
    board.update_issue(&id, &IssuePatch::title("keep")).unwrap();
    assert!(!board.begin_draft(&no).unwrap());
    assert_eq!(board.get(&id).unwrap().title, "keep");
}

#[test]
fn wrong_secret_keeps_guest_role() {
    let mut board = board_with(Vec::new());
    assert!(matches!(
        board.sign_in("guess", &SharedSecret::new("letmein")),
        Err(CorkboardError::Authorization(AuthorizationError::BadSecret))
    ));
    assert_eq!(board.role(), Role::Guest);
}
