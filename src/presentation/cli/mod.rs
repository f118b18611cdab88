pub mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use crate::common::error::RepoSyncError;
use crate::domain::value_objects::branch_selection::BranchSelection;
use crate::presentation::cli::commands::{
    context::SettingsOverrides, fetch::FetchCommand, list::ListCommand, push::PushCommand,
};

/// Exit code when every repository succeeded
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code when at least one repository failed, was skipped for a missing
/// remote or could not be opened
pub const EXIT_REPOSITORY_FAILURE: i32 = 1;
/// Exit code for configuration errors raised before any repository is processed
pub const EXIT_CONFIGURATION_ERROR: i32 = 2;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    " ",
    env!("BUILD_DATE"),
    ")"
);

/// Output format options for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// reposync - fetch or push every git repository under a directory
#[derive(Debug, Parser)]
#[command(name = "reposync")]
#[command(about = "Fetch or push every git repository under a directory")]
#[command(version, long_version = LONG_VERSION)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Settings file (defaults to <root>/reposync.yml if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by every subcommand
#[derive(Debug, Clone, Args)]
pub struct CatalogArgs {
    /// Directory whose immediate subdirectories are repositories
    #[arg(long, env = "REPOSYNC_ROOT", value_name = "DIR")]
    pub root: PathBuf,

    /// Directory name to skip (repeatable)
    #[arg(long, value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Remote to use instead of the configured one
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,
}

/// Arguments for subcommands that contact remotes
#[derive(Debug, Clone, Args)]
pub struct TransferArgs {
    /// Username for remotes whose URL carries none
    #[arg(long, env = "REPOSYNC_USERNAME")]
    pub username: Option<String>,

    /// Stop after the first repository that fails
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch every repository from its remote
    Fetch {
        #[command(flatten)]
        catalog: CatalogArgs,

        #[command(flatten)]
        transfer: TransferArgs,
    },

    /// Push local branches of every repository to its remote
    Push {
        #[command(flatten)]
        catalog: CatalogArgs,

        #[command(flatten)]
        transfer: TransferArgs,

        /// Branches to push: "all" or a comma separated list
        #[arg(long, value_name = "all|NAME,NAME")]
        branches: BranchSelection,

        /// Show what would be pushed without contacting the remote
        #[arg(long)]
        dry_run: bool,
    },

    /// List the repositories that would be synchronized
    List {
        #[command(flatten)]
        catalog: CatalogArgs,
    },
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    pub fn cli(&self) -> &Cli {
        &self.cli
    }

    /// Run the selected command and return the process exit code
    pub fn run(self) -> i32 {
        colored::control::set_override(!self.cli.no_color);

        match self.handle_command() {
            Ok(code) => code,
            Err(e) => {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                exit_code_for(&e)
            }
        }
    }

    fn handle_command(&self) -> anyhow::Result<i32> {
        let use_color = !self.cli.no_color;
        let config = self.cli.config.as_deref();

        match &self.cli.command {
            Commands::Fetch { catalog, transfer } => {
                let overrides = SettingsOverrides::from_args(catalog, Some(transfer));
                FetchCommand::new(&catalog.root, config, overrides, self.cli.output, use_color)
                    .execute()
            }
            Commands::Push {
                catalog,
                transfer,
                branches,
                dry_run,
            } => {
                let overrides = SettingsOverrides::from_args(catalog, Some(transfer));
                PushCommand::new(
                    &catalog.root,
                    config,
                    overrides,
                    branches.clone(),
                    *dry_run,
                    self.cli.output,
                    use_color,
                )
                .execute()
            }
            Commands::List { catalog } => {
                let overrides = SettingsOverrides::from_args(catalog, None);
                ListCommand::new(&catalog.root, config, overrides, self.cli.output, use_color)
                    .execute()
            }
        }
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration errors map to 2, anything else to 1
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<RepoSyncError>() {
        Some(e) if e.is_configuration_error() => EXIT_CONFIGURATION_ERROR,
        _ => EXIT_REPOSITORY_FAILURE,
    }
}
