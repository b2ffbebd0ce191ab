//! `cb login`, `cb logout`, `cb whoami`: the maintainer role.
//!
//! The role persists in `.corkboard/role.json` until `cb logout`. The
//! secret is a convenience lock configured in `.corkboard/config.toml`, not
//! a security boundary.

use crate::cmd::open_workspace;
use crate::output::{OutputMode, print_with};
use anyhow::Context as _;
use clap::Args;
use corkboard_core::{Role, SharedSecret};
use serde::Serialize;
use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;

/// Environment variable consulted when `--secret` is not given.
pub const SECRET_ENV: &str = "CORKBOARD_SECRET";

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Maintainer secret. Falls back to $CORKBOARD_SECRET, then stdin.
    #[arg(long)]
    pub secret: Option<String>,
}

#[derive(Args, Debug)]
pub struct LogoutArgs {}

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

#[derive(Debug, Serialize)]
struct RoleOutput {
    role: Role,
}

fn render_role(output: OutputMode, role: Role, verb: &str) -> anyhow::Result<()> {
    print_with(output, &RoleOutput { role }, |r, w| {
        writeln!(w, "{verb} {}", r.role)
    })
}

fn read_secret(args: &LoginArgs) -> anyhow::Result<String> {
    if let Some(secret) = &args.secret {
        return Ok(secret.clone());
    }
    if let Ok(secret) = std::env::var(SECRET_ENV) {
        return Ok(secret);
    }
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprint!("Maintainer secret: ");
        std::io::stderr().flush()?;
    }
    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("failed to read secret from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn run_login(args: &LoginArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut workspace = open_workspace(project_root)?;
    let secret = read_secret(args)?;
    let verifier = SharedSecret::new(&workspace.config.auth.maintainer_secret);
    let role = workspace.board.sign_in(&secret, &verifier)?;
    render_role(output, role, "✓ signed in as")
}

pub fn run_logout(_args: &LogoutArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut workspace = open_workspace(project_root)?;
    let role = workspace.board.sign_out()?;
    render_role(output, role, "✓ signed out; now")
}

pub fn run_whoami(_args: &WhoamiArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let workspace = open_workspace(project_root)?;
    render_role(output, workspace.board.role(), "role:")
}
