pub mod board;
pub mod comment;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod move_cmd;
pub mod new;
pub mod reset;
pub mod session;
pub mod show;
pub mod sync;

use anyhow::Context as _;
use corkboard_core::config::{ProjectConfig, load_project_config};
use corkboard_core::error::ErrorCode;
use corkboard_core::model::SystemClock;
use corkboard_core::storage::BOARD_DIR;
use corkboard_core::{Board, FileStorage, baseline};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use crate::output::CliError;

/// The board as every command sees it.
pub type CliBoard = Board<FileStorage, SystemClock>;

/// An opened board plus the project it lives in.
pub struct Workspace {
    pub root: PathBuf,
    pub config: ProjectConfig,
    pub board: CliBoard,
}

/// Walk up from `start` to the nearest directory holding `.corkboard/`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(BOARD_DIR).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Locate, configure and open the board for `start`.
///
/// # Errors
///
/// `E1001` when no `.corkboard/` directory exists up the tree, or config,
/// baseline and storage failures.
pub fn open_workspace(start: &Path) -> anyhow::Result<Workspace> {
    let root = find_project_root(start).ok_or_else(|| {
        CliError::coded(
            ErrorCode::NotInitialized,
            "Not a corkboard project: .corkboard directory not found",
        )
    })?;
    open_at(root)
}

/// Open the board rooted at `root`, seeding it on first use.
///
/// # Errors
///
/// Config, baseline and storage failures.
pub fn open_at(root: PathBuf) -> anyhow::Result<Workspace> {
    let config = load_project_config(&root).map_err(|err| {
        CliError::coded(ErrorCode::ConfigParseError, format!("{err:#}"))
    })?;

    let clock = SystemClock;
    let seed = baseline::load(config.baseline_path(&root).as_deref(), &clock)?;
    // Every command is its own process; re-syncing here would resurrect
    // deleted baseline issues on the next run. `cb sync` re-syncs instead.
    let board = Board::restore(
        FileStorage::for_project(&root),
        clock,
        seed,
        &config.board.extra_statuses,
    )
    .with_context(|| format!("failed to open board at {}", root.display()))?;

    Ok(Workspace {
        root,
        config,
        board,
    })
}

/// Ask a yes/no question on stderr and read the answer from stdin.
///
/// Without an interactive terminal nothing can be asked, so the answer is
/// no; callers offer a `--yes`/`--force` flag for scripts.
pub fn prompt_yes_no(question: &str) -> bool {
    if !std::io::stdin().is_terminal() {
        return false;
    }
    eprint!("{question} [y/N] ");
    if std::io::stderr().flush().is_err() {
        return false;
    }
    let mut input = String::new();
    if std::io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
