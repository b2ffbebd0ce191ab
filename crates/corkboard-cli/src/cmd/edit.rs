//! `cb edit`: patch fields of an existing issue.

use crate::cmd::open_workspace;
use crate::cmd::show::IssueDetail;
use crate::output::{CliError, OutputMode, print_item};
use clap::Args;
use corkboard_core::{IssuePatch, Priority};
use std::path::Path;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Issue ID.
    pub id: String,

    /// New title.
    #[arg(short, long)]
    pub title: Option<String>,

    /// New description.
    #[arg(short, long)]
    pub description: Option<String>,

    /// New status. Prefer `cb move` for column changes.
    #[arg(short, long)]
    pub status: Option<String>,

    /// New priority.
    #[arg(short, long, conflicts_with = "clear_priority")]
    pub priority: Option<Priority>,

    /// Remove the priority.
    #[arg(long)]
    pub clear_priority: bool,

    /// New assignee (empty string to unassign).
    #[arg(short, long)]
    pub assignee: Option<String>,

    /// Replace the tag list. Repeat for several.
    #[arg(long = "tag", conflicts_with = "clear_tags")]
    pub tags: Vec<String>,

    /// Remove every tag.
    #[arg(long)]
    pub clear_tags: bool,
}

impl EditArgs {
    fn patch(&self) -> IssuePatch {
        let priority = if self.clear_priority {
            Some(None)
        } else {
            self.priority.map(Some)
        };
        let tags = if self.clear_tags {
            Some(Vec::new())
        } else {
            (!self.tags.is_empty()).then(|| self.tags.clone())
        };
        IssuePatch {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
            priority,
            assignee: self.assignee.clone(),
            tags,
        }
    }
}

pub fn run_edit(args: &EditArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let patch = args.patch();
    if patch.is_empty() {
        return Err(CliError::plain("nothing to change")
            .suggest(
                "Pass at least one of --title, --description, --status, --priority, --assignee, --tag",
            )
            .into());
    }

    let mut workspace = open_workspace(project_root)?;
    let updated = workspace.board.update_issue(&args.id, &patch)?;
    print_item(&IssueDetail(&updated), output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: EditArgs,
    }

    #[test]
    fn no_flags_is_an_empty_patch() {
        let w = Wrapper::parse_from(["test", "ISSUE-1"]);
        assert!(w.args.patch().is_empty());
    }

    #[test]
    fn clear_flags_produce_explicit_empties() {
        let w = Wrapper::parse_from(["test", "ISSUE-1", "--clear-priority", "--clear-tags"]);
        let patch = w.args.patch();
        assert_eq!(patch.priority, Some(None));
        assert_eq!(patch.tags, Some(Vec::new()));
    }

    #[test]
    fn priority_and_clear_priority_conflict() {
        assert!(
            Wrapper::try_parse_from(["test", "ISSUE-1", "-p", "P0", "--clear-priority"]).is_err()
        );
    }
}
