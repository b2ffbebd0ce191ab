//! `cb import`: append issues from a file, a URL or stdin.
//!
//! Imports never overwrite: issues whose id is already on the board are
//! dropped, and an import with nothing new leaves the board untouched.

use crate::cmd::open_workspace;
use crate::output::{OutputMode, print_with};
use anyhow::Context as _;
use clap::Args;
use corkboard_core::{CorkboardError, MergeReport};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Read the payload from a JSON file.
    #[arg(long, value_name = "PATH", conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Fetch the payload with an HTTP GET.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImportOutput {
    source: String,
    #[serde(flatten)]
    report: MergeReport,
    total: usize,
}

/// Fetch `url` and return the response body.
///
/// # Errors
///
/// [`CorkboardError::Network`] for a non-success status or any transport
/// failure.
pub fn fetch(url: &str) -> Result<String, CorkboardError> {
    let network = |detail: String| CorkboardError::Network {
        url: url.to_string(),
        detail,
    };

    debug!(%url, "fetching import payload");
    let response = ureq::get(url)
        .set("Accept", "application/json")
        .set("User-Agent", concat!("corkboard/", env!("CARGO_PKG_VERSION")))
        .timeout(FETCH_TIMEOUT)
        .call()
        .map_err(|err| match err {
            ureq::Error::Status(code, response) => {
                network(format!("HTTP {code} {}", response.status_text()))
            }
            ureq::Error::Transport(transport) => network(transport.to_string()),
        })?;

    response
        .into_string()
        .map_err(|err| network(format!("failed to read response body: {err}")))
}

fn read_payload(args: &ImportArgs) -> anyhow::Result<(String, String)> {
    if let Some(url) = &args.url {
        return Ok((url.clone(), fetch(url)?));
    }
    if let Some(path) = &args.file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok((path.display().to_string(), text));
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read payload from stdin")?;
    Ok(("stdin".to_string(), text))
}

pub fn run_import(args: &ImportArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut workspace = open_workspace(project_root)?;
    let (source, text) = read_payload(args)?;

    let report = workspace.board.import_text(&text)?;
    info!(%source, added = report.added, "import finished");

    let payload = ImportOutput {
        source,
        report,
        total: workspace.board.issues().len(),
    };
    print_with(output, &payload, |p, w| {
        if p.report.is_noop() {
            writeln!(w, "No new issues in {} ({} already on the board)", p.source, p.report.kept_local)
        } else {
            writeln!(
                w,
                "✓ Imported {} issue(s) from {} ({} skipped, board now has {})",
                p.report.added,
                p.source,
                p.report.kept_local + p.report.dropped,
                p.total
            )
        }
    })
}
