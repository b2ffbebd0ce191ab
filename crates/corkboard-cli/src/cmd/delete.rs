//! `cb delete`: remove an issue from the board.
//!
//! Guests may only delete issues they created; the denial is reported, not
//! silently ignored.

use crate::cmd::{open_workspace, prompt_yes_no};
use crate::output::{OutputMode, print_with};
use clap::Args;
use corkboard_core::auth::Action;
use corkboard_core::{CorkboardError, Deleted};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Issue ID.
    pub id: String,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct DeleteOutput {
    id: String,
    title: String,
    /// `issue` for a persisted issue, `draft` for a discarded draft.
    kind: &'static str,
}

pub fn run_delete(args: &DeleteArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut workspace = open_workspace(project_root)?;
    let board = &mut workspace.board;

    let title = board
        .get(&args.id)
        .map(|issue| issue.title.clone())
        .ok_or_else(|| CorkboardError::NotFound(args.id.clone()))?;
    // Refuse before prompting.
    board.check(Action::Delete, &args.id)?;

    if !args.force && !prompt_yes_no(&format!("Delete {} '{title}'?", args.id)) {
        return Err(CorkboardError::Cancelled("deletion not confirmed").into());
    }

    let (kind, removed) = match board.delete_issue(&args.id)? {
        Deleted::Issue(issue) => ("issue", issue),
        Deleted::Draft(issue) => ("draft", issue),
    };

    let payload = DeleteOutput {
        id: removed.id,
        title: removed.title,
        kind,
    };
    print_with(output, &payload, |p, w| {
        writeln!(w, "✓ deleted {} {} '{}'", p.kind, p.id, p.title)
    })
}
