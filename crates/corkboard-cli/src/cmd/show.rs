//! `cb show`: show one issue in full.

use crate::cmd::open_workspace;
use crate::output::{OutputMode, Renderable, field, print_item, rule};
use clap::Args;
use corkboard_core::{CorkboardError, Issue};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Issue ID.
    pub id: String,
}

/// Full rendering of one issue, shared by every command that reports an
/// issue back to the user.
#[derive(Serialize)]
#[serde(transparent)]
pub struct IssueDetail<'a>(pub &'a Issue);

impl Renderable for IssueDetail<'_> {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let issue = self.0;
        writeln!(w, "{}  {}", issue.id, issue.title)?;
        rule(w)?;
        field(w, "Status", &issue.status)?;
        if let Some(priority) = issue.priority {
            field(w, "Priority", priority.as_str())?;
        }
        if !issue.assignee.is_empty() {
            field(w, "Assignee", &issue.assignee)?;
        }
        if !issue.tags.is_empty() {
            field(w, "Tags", issue.tags.join(", "))?;
        }
        field(w, "Created", &issue.created_at)?;
        field(w, "Updated", &issue.updated_at)?;
        if issue.created_by_visitor {
            field(w, "Origin", "visitor")?;
        }
        if !issue.description.is_empty() {
            writeln!(w)?;
            for line in issue.description.lines() {
                writeln!(w, "  {line}")?;
            }
        }
        if !issue.comments.is_empty() {
            writeln!(w)?;
            writeln!(w, "Comments ({})", issue.comments.len())?;
            for comment in &issue.comments {
                let author = if comment.author.is_empty() {
                    "anonymous"
                } else {
                    comment.author.as_str()
                };
                writeln!(w, "  [{}] {author}: {}", comment.created_at, comment.body)?;
            }
        }
        Ok(())
    }

    fn render_row(&self, w: &mut dyn Write) -> io::Result<()> {
        let issue = self.0;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            issue.id,
            issue.status,
            issue.priority.map_or("-", |p| p.as_str()),
            if issue.assignee.is_empty() { "-" } else { issue.assignee.as_str() },
            issue.tags.join(","),
            issue.title
        )?;
        for comment in &issue.comments {
            writeln!(w, "comment\t{}\t{}\t{}", comment.id, comment.author, comment.body)?;
        }
        Ok(())
    }
}

pub fn run_show(args: &ShowArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let workspace = open_workspace(project_root)?;
    let issue = workspace
        .board
        .get(&args.id)
        .ok_or_else(|| CorkboardError::NotFound(args.id.clone()))?;
    print_item(&IssueDetail(issue), output)?;
    Ok(())
}
