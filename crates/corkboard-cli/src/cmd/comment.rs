//! `cb comment`: add a comment to an issue.

use crate::cmd::open_workspace;
use crate::output::{OutputMode, print_with};
use clap::Args;
use corkboard_core::Comment;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct CommentArgs {
    /// Issue ID.
    pub id: String,

    /// Comment text.
    pub body: String,

    /// Author name (defaults to $USER, then the current role).
    #[arg(long)]
    pub author: Option<String>,
}

pub fn run_comment(args: &CommentArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut workspace = open_workspace(project_root)?;
    let board = &mut workspace.board;

    let author = args
        .author
        .clone()
        .or_else(|| std::env::var("USER").ok().filter(|user| !user.is_empty()))
        .unwrap_or_else(|| board.role().as_str().to_string());

    let comment: Comment = board.add_comment(&args.id, &author, &args.body)?;
    print_with(output, &comment, |c, w| {
        writeln!(w, "✓ {} commented on {} ({})", c.author, args.id, c.id)
    })
}
