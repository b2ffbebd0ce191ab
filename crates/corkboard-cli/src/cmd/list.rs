//! `cb list`: list issues with filtering.

use crate::cmd::open_workspace;
use crate::output::{OutputMode, Renderable, print_list};
use clap::Args;
use corkboard_core::Issue;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only issues whose stored status matches (case-insensitive).
    #[arg(short, long)]
    pub status: Option<String>,

    /// Only issues carrying this tag. Repeat to require several.
    #[arg(short, long)]
    pub tag: Vec<String>,

    /// Only issues assigned to this person.
    #[arg(short, long)]
    pub assignee: Option<String>,

    /// Maximum issues to show.
    #[arg(short = 'n', long, default_value = "50")]
    pub limit: usize,
}

impl ListArgs {
    fn matches(&self, issue: &Issue) -> bool {
        self.status
            .as_deref()
            .is_none_or(|status| issue.status.eq_ignore_ascii_case(status))
            && self
                .assignee
                .as_deref()
                .is_none_or(|assignee| issue.assignee == assignee)
            && self.tag.iter().all(|tag| issue.tags.contains(tag))
    }
}

/// One-line summary of an issue. Serializes as the full issue.
#[derive(Serialize)]
#[serde(transparent)]
pub struct IssueRow<'a>(pub &'a Issue);

impl Renderable for IssueRow<'_> {
    const COLUMNS: &'static [&'static str] = &["ID", "STATUS", "PRIORITY", "TITLE"];

    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let issue = self.0;
        let priority = issue.priority.map_or("  ", |p| p.as_str());
        writeln!(
            w,
            "{:<10} {priority} {:<12} {}",
            issue.id, issue.status, issue.title
        )
    }

    fn render_row(&self, w: &mut dyn Write) -> io::Result<()> {
        let issue = self.0;
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            issue.id,
            issue.status,
            issue.priority.map_or("-", |p| p.as_str()),
            issue.title
        )
    }
}

pub fn run_list(args: &ListArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let workspace = open_workspace(project_root)?;
    let rows: Vec<IssueRow<'_>> = workspace
        .board
        .issues()
        .iter()
        .filter(|issue| args.matches(issue))
        .take(args.limit)
        .map(IssueRow)
        .collect();
    print_list(&rows, output)?;
    Ok(())
}
