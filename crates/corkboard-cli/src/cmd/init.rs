use crate::cmd::open_at;
use crate::output::{OutputMode, print_with};
use anyhow::{Context as _, Result};
use clap::Args;
use corkboard_core::storage::BOARD_DIR;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite the config template even if `.corkboard/` already exists.
    /// Existing issues are kept.
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TOML: &str = "[auth]\n\
    # Unlocks the maintainer role via `cb login`. A convenience lock, not security.\n\
    maintainer_secret = \"letmein\"\n\
    \n\
    [board]\n\
    # Seed dataset; omit to use the bundled one.\n\
    # baseline = \"seed/issues.json\"\n\
    # Extra columns shown before Archived.\n\
    extra_statuses = []\n";

const GITIGNORE: &str = "lock\nrole.json\n*.tmp\n";

#[derive(Debug, Serialize)]
struct InitOutput {
    board_dir: String,
    issues: usize,
}

/// Execute `cb init`. Creates the board skeleton and seeds it:
///
/// ```text
/// .corkboard/
///   config.toml   (project config template)
///   .gitignore    (lock, role.json, temp files)
///   issues.json   (seeded from the baseline)
/// ```
///
/// # Errors
///
/// Returns an error if `.corkboard/` already exists and `--force` is not
/// set, or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, quiet: bool, project_root: &Path) -> Result<()> {
    let board_dir = project_root.join(BOARD_DIR);

    if board_dir.exists() && !args.force {
        anyhow::bail!(".corkboard/ already exists. Use `cb init --force` to rewrite the config.");
    }

    std::fs::create_dir_all(&board_dir)
        .with_context(|| format!("Failed to create {}", board_dir.display()))?;

    let config_path = board_dir.join("config.toml");
    std::fs::write(&config_path, CONFIG_TOML)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = board_dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    let workspace = open_at(project_root.to_path_buf())?;

    let payload = InitOutput {
        board_dir: board_dir.display().to_string(),
        issues: workspace.board.issues().len(),
    };
    print_with(output, &payload, |p, w| {
        writeln!(w, "✓ Initialized .corkboard/ with {} issues.", p.issues)?;
        if !quiet {
            writeln!(w)?;
            writeln!(w, "  Config: .corkboard/config.toml")?;
            writeln!(w)?;
            writeln!(w, "Next steps:")?;
            writeln!(w, "  cb board                      # see the columns")?;
            writeln!(w, "  cb new --title \"Fix login\"    # file an issue")?;
            writeln!(w, "  cb login                      # unlock maintainer actions")?;
        }
        Ok(())
    })
}
