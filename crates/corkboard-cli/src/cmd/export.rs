//! `cb export`: write the board as a pretty-printed JSON array.

use crate::cmd::open_workspace;
use crate::output::{OutputMode, print_with};
use anyhow::Context as _;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output path, relative to the current directory. `-` writes to stdout.
    #[arg(short, long, value_name = "PATH", default_value = "issues.json")]
    pub output: PathBuf,
}

#[derive(Debug, Serialize)]
struct ExportOutput {
    path: String,
    count: usize,
}

pub fn run_export(args: &ExportArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let workspace = open_workspace(project_root)?;
    let json = workspace.board.export_json()?;

    if args.output.as_os_str() == "-" {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{json}")?;
        return Ok(());
    }

    let path = project_root.join(&args.output);
    std::fs::write(&path, format!("{json}\n"))
        .with_context(|| format!("failed to write {}", path.display()))?;

    let payload = ExportOutput {
        path: path.display().to_string(),
        count: workspace.board.issues().len(),
    };
    print_with(output, &payload, |p, w| {
        writeln!(w, "✓ Exported {} issue(s) to {}", p.count, p.path)
    })
}
