//! `cb move`: move an issue to another column.

use crate::cmd::open_workspace;
use crate::output::{OutputMode, print_with};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::warn;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Issue ID.
    pub id: String,

    /// Target status, e.g. "In Progress".
    pub status: String,
}

#[derive(Debug, Serialize)]
struct MoveOutput {
    id: String,
    from: String,
    to: String,
    /// Whether the board shows a column for the new status.
    known_status: bool,
}

pub fn run_move(args: &MoveArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut workspace = open_workspace(project_root)?;
    let board = &mut workspace.board;

    let from = board
        .get(&args.id)
        .map(|issue| issue.status.clone())
        .unwrap_or_default();
    let moved = board.move_issue(&args.id, &args.status)?;

    let known_status = board.statuses().contains(&moved.status);
    if !known_status {
        warn!(id = %moved.id, status = %moved.status, "status has no column; shown under Backlog");
    }

    let payload = MoveOutput {
        id: moved.id,
        from,
        to: moved.status,
        known_status,
    };
    print_with(output, &payload, |p, w| {
        writeln!(w, "✓ {}: {} → {}", p.id, p.from, p.to)?;
        if !p.known_status {
            writeln!(w, "  note: '{}' is not a board column; the card shows under Backlog", p.to)?;
        }
        Ok(())
    })
}
