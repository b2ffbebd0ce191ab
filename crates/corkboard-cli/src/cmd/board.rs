//! `cb board`: the kanban view: one column per status.

use crate::cmd::open_workspace;
use crate::output::{OutputMode, print_with, section};
use clap::Args;
use corkboard_core::model::Column;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct BoardArgs {
    /// Hide columns with no issues.
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Serialize)]
struct CardView<'a> {
    id: &'a str,
    title: &'a str,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct ColumnView<'a> {
    status: &'a str,
    issues: Vec<CardView<'a>>,
}

impl<'a> From<&Column<'a>> for ColumnView<'a> {
    fn from(column: &Column<'a>) -> Self {
        Self {
            status: column.status,
            issues: column
                .issues
                .iter()
                .map(|&issue| CardView {
                    id: &issue.id,
                    title: &issue.title,
                    status: &issue.status,
                    priority: issue.priority.map(|p| p.as_str()),
                })
                .collect(),
        }
    }
}

pub fn run_board(args: &BoardArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let workspace = open_workspace(project_root)?;
    let columns = workspace.board.columns();
    let views: Vec<ColumnView<'_>> = columns
        .iter()
        .filter(|column| !args.compact || !column.issues.is_empty())
        .map(ColumnView::from)
        .collect();

    print_with(output, &views, |views, w| {
        for (i, column) in views.iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            section(w, &format!("{} ({})", column.status, column.issues.len()))?;
            for card in &column.issues {
                let priority = card.priority.unwrap_or("  ");
                // Cards bucketed here from an unknown status keep their own label.
                if card.status == column.status {
                    writeln!(w, "  {:<10} {priority} {}", card.id, card.title)?;
                } else {
                    writeln!(w, "  {:<10} {priority} {} [{}]", card.id, card.title, card.status)?;
                }
            }
        }
        Ok(())
    })
}
