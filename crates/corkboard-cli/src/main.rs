#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, print_error};
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "cb: a local-first issue board",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a board",
        long_about = "Create .corkboard/ in the current directory and seed it from the baseline dataset.",
        after_help = "EXAMPLES:\n    # Initialize a board in the current directory\n    cb init\n\n    # Emit machine-readable output\n    cb init --json"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show the board columns",
        long_about = "Show every issue grouped into one column per status. Issues with an unknown status appear under Backlog.",
        after_help = "EXAMPLES:\n    # Show all columns\n    cb board\n\n    # Hide empty columns\n    cb board --compact"
    )]
    Board(cmd::board::BoardArgs),

    #[command(
        next_help_heading = "Read",
        about = "List issues",
        long_about = "List issues in board order with optional filters.",
        after_help = "EXAMPLES:\n    # List everything\n    cb list\n\n    # Filter by status and tag\n    cb list --status todo --tag ui\n\n    # Emit machine-readable output\n    cb list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one issue",
        long_about = "Show full details for a single issue, including comments.",
        after_help = "EXAMPLES:\n    # Show an issue\n    cb show ISSUE-3\n\n    # Emit machine-readable output\n    cb show ISSUE-3 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Issues",
        about = "File a new issue",
        long_about = "Stage a draft, fill it in and save it to the front of the board.",
        after_help = "EXAMPLES:\n    # File an issue\n    cb new --title \"Fix login timeout\"\n\n    # With details\n    cb new -t \"Crash on save\" -p P1 --tag bug --assignee kim"
    )]
    New(cmd::new::NewArgs),

    #[command(
        next_help_heading = "Issues",
        about = "Edit an issue",
        long_about = "Change fields of an issue. Guests may only edit issues they created.",
        after_help = "EXAMPLES:\n    # Retitle\n    cb edit ISSUE-3 --title \"Better title\"\n\n    # Replace tags and clear priority\n    cb edit ISSUE-3 --tag ui --tag docs --clear-priority"
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        next_help_heading = "Issues",
        about = "Move an issue to another column",
        long_about = "Change an issue's status. Guests may only move issues they created.",
        after_help = "EXAMPLES:\n    # Start work\n    cb move ISSUE-3 \"In Progress\"\n\n    # Finish\n    cb move ISSUE-3 Done"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Issues",
        about = "Delete an issue",
        long_about = "Remove an issue from the board. Guests may only delete issues they created.",
        after_help = "EXAMPLES:\n    # Delete with a confirmation prompt\n    cb delete ISSUE-3\n\n    # Delete without prompting\n    cb delete ISSUE-3 --force"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Issues",
        about = "Comment on an issue",
        long_about = "Append a comment to an issue.",
        after_help = "EXAMPLES:\n    # Comment as $USER\n    cb comment ISSUE-3 \"Reproduced on main\"\n\n    # Comment with an explicit author\n    cb comment ISSUE-3 \"LGTM\" --author kim"
    )]
    Comment(cmd::comment::CommentArgs),

    #[command(
        next_help_heading = "Data",
        about = "Import issues",
        long_about = "Append issues from a JSON file, a URL or stdin. Issues whose id is already on the board are skipped.",
        after_help = "EXAMPLES:\n    # From a file\n    cb import --file bugs.json\n\n    # From a URL\n    cb import --url https://example.com/issues.json\n\n    # From stdin\n    cat export.json | cb import"
    )]
    Import(cmd::import::ImportArgs),

    #[command(
        next_help_heading = "Data",
        about = "Re-sync with the baseline",
        long_about = "Add baseline issues missing from the board. Issues already on the board are kept exactly as they are.",
        after_help = "EXAMPLES:\n    # Pull in new baseline issues\n    cb sync"
    )]
    Sync(cmd::sync::SyncArgs),

    #[command(
        next_help_heading = "Data",
        about = "Reset the board to the baseline",
        long_about = "Replace every issue with the baseline dataset. Maintainers only.",
        after_help = "EXAMPLES:\n    # Reset with a confirmation prompt\n    cb reset\n\n    # Reset from a script\n    cb reset --yes"
    )]
    Reset(cmd::reset::ResetArgs),

    #[command(
        next_help_heading = "Data",
        about = "Export the board as JSON",
        long_about = "Write every issue as a pretty-printed JSON array.",
        after_help = "EXAMPLES:\n    # Write issues.json\n    cb export\n\n    # Write to stdout\n    cb export --output -"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Session",
        about = "Sign in as maintainer",
        after_help = "EXAMPLES:\n    # Prompt for the secret\n    cb login\n\n    # Pass it explicitly\n    cb login --secret letmein"
    )]
    Login(cmd::session::LoginArgs),

    #[command(next_help_heading = "Session", about = "Return to the guest role")]
    Logout(cmd::session::LogoutArgs),

    #[command(next_help_heading = "Session", about = "Show the current role")]
    Whoami(cmd::session::WhoamiArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    cb completions bash\n\n    # Generate zsh completions\n    cb completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CORKBOARD_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "corkboard_core=debug,cb=debug,info"
        } else {
            "corkboard_core=info,cb=info,warn"
        })
    });

    let format = env::var("CORKBOARD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let output = cli.output_mode();

    let command_result = match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, cli.quiet, &project_root),
        Commands::Board(args) => cmd::board::run_board(args, output, &project_root),
        Commands::List(args) => cmd::list::run_list(args, output, &project_root),
        Commands::Show(args) => cmd::show::run_show(args, output, &project_root),
        Commands::New(args) => cmd::new::run_new(args, output, &project_root),
        Commands::Edit(args) => cmd::edit::run_edit(args, output, &project_root),
        Commands::Move(args) => cmd::move_cmd::run_move(args, output, &project_root),
        Commands::Delete(args) => cmd::delete::run_delete(args, output, &project_root),
        Commands::Comment(args) => cmd::comment::run_comment(args, output, &project_root),
        Commands::Import(args) => cmd::import::run_import(args, output, &project_root),
        Commands::Sync(args) => cmd::sync::run_sync(args, output, &project_root),
        Commands::Reset(args) => cmd::reset::run_reset(args, output, &project_root),
        Commands::Export(args) => cmd::export::run_export(args, output, &project_root),
        Commands::Login(args) => cmd::session::run_login(args, output, &project_root),
        Commands::Logout(args) => cmd::session::run_logout(args, output, &project_root),
        Commands::Whoami(args) => cmd::session::run_whoami(args, output, &project_root),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    };

    if let Err(err) = command_result {
        print_error(output, &CliError::from(&err))?;
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["cb", "--json", "list"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["cb", "list", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn quiet_and_verbose_flags_parsed() {
        let cli = Cli::parse_from(["cb", "-q", "init"]);
        assert!(cli.quiet);
        let cli = Cli::parse_from(["cb", "board", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn new_requires_title() {
        assert!(Cli::try_parse_from(["cb", "new"]).is_err());
        let cli = Cli::parse_from(["cb", "new", "--title", "My issue"]);
        assert!(matches!(cli.command, Commands::New(_)));
    }

    #[test]
    fn move_takes_id_and_status() {
        let cli = Cli::parse_from(["cb", "move", "ISSUE-1", "In Progress"]);
        let Commands::Move(args) = cli.command else {
            panic!("expected move");
        };
        assert_eq!(args.id, "ISSUE-1");
        assert_eq!(args.status, "In Progress");
    }

    #[test]
    fn import_file_and_url_conflict() {
        assert!(
            Cli::try_parse_from(["cb", "import", "--file", "a.json", "--url", "http://x"]).is_err()
        );
        let cli = Cli::parse_from(["cb", "import"]);
        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert!(args.file.is_none() && args.url.is_none());
    }

    #[test]
    fn export_defaults_to_issues_json() {
        let cli = Cli::parse_from(["cb", "export"]);
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.output, std::path::PathBuf::from("issues.json"));
    }

    #[test]
    fn session_subcommands_parse() {
        assert!(matches!(
            Cli::parse_from(["cb", "login", "--secret", "s"]).command,
            Commands::Login(_)
        ));
        assert!(matches!(Cli::parse_from(["cb", "logout"]).command, Commands::Logout(_)));
        assert!(matches!(Cli::parse_from(["cb", "whoami"]).command, Commands::Whoami(_)));
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["cb", "completions", "bash"]);
        assert!(matches!(cli.command, Commands::Completions(_)));
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
