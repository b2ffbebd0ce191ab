//! `cb new`: stage a draft, fill it in and save it in one step.

use crate::cmd::open_workspace;
use crate::cmd::show::IssueDetail;
use crate::output::{OutputMode, print_item};
use clap::Args;
use corkboard_core::{IssuePatch, Priority};
use std::path::Path;
use tracing::debug;

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Issue title (required, must not be blank).
    #[arg(short, long)]
    pub title: String,

    /// Longer description.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Initial status (default: Backlog).
    #[arg(short, long)]
    pub status: Option<String>,

    /// Priority: P0 (most urgent) to P3.
    #[arg(short, long)]
    pub priority: Option<Priority>,

    /// Person responsible.
    #[arg(short, long)]
    pub assignee: Option<String>,

    /// Tag to attach. Repeat for several.
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

impl NewArgs {
    fn patch(&self) -> IssuePatch {
        IssuePatch {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            status: self.status.clone(),
            priority: self.priority.map(Some),
            assignee: self.assignee.clone(),
            tags: (!self.tags.is_empty()).then(|| self.tags.clone()),
        }
    }
}

pub fn run_new(args: &NewArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut workspace = open_workspace(project_root)?;
    let board = &mut workspace.board;

    // A fresh process never has a pending draft, so there is nothing to discard.
    board.begin_draft(&|_: &str| true)?;
    let draft_id = board
        .draft()
        .pending()
        .map(|draft| draft.id.clone())
        .unwrap_or_default();
    debug!(%draft_id, "filling draft");

    board.update_issue(&draft_id, &args.patch())?;
    let saved = board.save_draft()?;

    print_item(&IssueDetail(&saved), output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: NewArgs,
    }

    #[test]
    fn minimal_patch_sets_only_title() {
        let w = Wrapper::parse_from(["test", "--title", "Crash"]);
        assert_eq!(w.args.patch(), IssuePatch::title("Crash"));
    }

    #[test]
    fn full_patch_parses_priority_and_tags() {
        let w = Wrapper::parse_from([
            "test", "-t", "Crash", "-p", "p1", "--tag", "ui", "--tag", "bug", "-a", "kim",
        ]);
        let patch = w.args.patch();
        assert_eq!(patch.priority, Some(Some(Priority::P1)));
        assert_eq!(patch.tags, Some(vec!["ui".to_string(), "bug".to_string()]));
        assert_eq!(patch.assignee.as_deref(), Some("kim"));
    }

    #[test]
    fn unknown_priority_is_rejected() {
        assert!(Wrapper::try_parse_from(["test", "-t", "x", "-p", "urgent"]).is_err());
    }
}
