//! `cb reset`: replace the whole board with the baseline. Maintainers only.

use crate::cmd::{open_workspace, prompt_yes_no};
use crate::output::{OutputMode, print_with};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Confirm without prompting.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
struct ResetOutput {
    total: usize,
}

pub fn run_reset(args: &ResetArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut workspace = open_workspace(project_root)?;
    let assume_yes = args.yes;
    workspace
        .board
        .reset(&|prompt: &str| assume_yes || prompt_yes_no(prompt))?;

    let payload = ResetOutput {
        total: workspace.board.issues().len(),
    };
    print_with(output, &payload, |p, w| {
        writeln!(w, "✓ Board reset to baseline ({} issues)", p.total)
    })
}
