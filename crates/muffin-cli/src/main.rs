use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

/// Run groups of muffin script tests.
///
/// Every subdirectory of the test root is a group. Each file in a group is
/// loaded as a test module, and every class whose name ends in the suffix
/// (default "Test") has its test methods run.
///
/// EXAMPLES:
///     muffin                        Run every group
///     muffin group editors          Run only the "editors" group
///     muffin list                   Show the groups and their files
///     muffin run --json             Print the report as JSON
///     muffin -v group editors       Show output printed by tests
///
/// ENVIRONMENT VARIABLES:
///     MUFFIN_ROOT       Test root directory
///     MUFFIN_SUFFIX     Class-name suffix of test cases
///     MUFFIN_VERBOSE    Set to '1' to show output printed by tests
///     MUFFIN_JSON       Set to '1' for JSON output by default
///     NO_COLOR          Set to disable colored output
///     RUST_LOG          Log filter (default: warn)
#[derive(Parser)]
#[command(name = "muffin")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every test group and report the grand total
    ///
    /// The test root is re-indexed before the run. A module that fails to
    /// load counts as one errored test and the run continues.
    ///
    /// EXAMPLES:
    ///     muffin run
    ///     muffin run --root tests/unit
    #[command(visible_alias = "r")]
    Run,

    /// Run a single test group
    ///
    /// EXAMPLES:
    ///     muffin group editors
    ///     muffin group editors --verbose
    #[command(visible_alias = "g")]
    Group {
        /// Group name (a directory name under the test root)
        name: String,
    },

    /// List the test groups and the files they contain
    #[command(visible_alias = "ls")]
    List,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Test root directory (overrides muffin.toml and MUFFIN_ROOT)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Project configuration file to use instead of searching for muffin.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show output printed by tests
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Class-name suffix that marks test cases
    #[arg(long, global = true)]
    pub suffix: Option<String>,

    /// Print a machine-readable JSON report
    #[arg(long, global = true, env = "MUFFIN_JSON")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(&cli.global),
        Commands::Group { name } => commands::group::run(&cli.global, &name),
        Commands::List => commands::list::run(&cli.global),
    };

    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            if cli.global.no_color {
                colored::control::set_override(false);
            }
            eprintln!("{} {:#}", "[ERROR]".red().bold(), err);
            ExitCode::from(commands::EXIT_ERROR)
        }
    }
}
