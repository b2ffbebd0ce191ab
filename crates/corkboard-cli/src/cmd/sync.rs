//! `cb sync`: re-sync with the baseline dataset. Local records always win.

use crate::cmd::open_workspace;
use crate::output::{OutputMode, print_with};
use clap::Args;
use corkboard_core::MergeReport;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct SyncArgs {}

#[derive(Debug, Serialize)]
struct SyncOutput {
    #[serde(flatten)]
    report: MergeReport,
    total: usize,
}

pub fn run_sync(_args: &SyncArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut workspace = open_workspace(project_root)?;
    let report = workspace.board.resync()?;
    let payload = SyncOutput {
        report,
        total: workspace.board.issues().len(),
    };
    print_with(output, &payload, |p, w| {
        if p.report.is_noop() {
            writeln!(w, "✓ Board is up to date with the baseline ({} issues)", p.total)
        } else {
            writeln!(
                w,
                "✓ Added {} baseline issue(s); {} local issue(s) kept as edited",
                p.report.added, p.report.kept_local
            )
        }
    })
}
