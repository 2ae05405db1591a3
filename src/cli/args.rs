//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `sync`: Translate missing and changed keys, or report them with `--dry-run`
//! - `init`: Create a default configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Sync(cmd)) => cmd.args.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by commands that read locales.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Path to the configuration file (default: search upward for linguasync.config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Locales directory (overrides config file)
    #[arg(long)]
    pub locales_dir: Option<PathBuf>,

    /// Base language code (overrides config file)
    #[arg(long)]
    pub base_lang: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser)]
pub struct SyncArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Update all available languages
    #[arg(long, conflicts_with = "lang")]
    pub all: bool,

    /// Comma-separated language codes to update (e.g. jp,el,de)
    #[arg(long, value_delimiter = ',')]
    pub lang: Vec<String>,

    /// Show what would be updated without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Save the dry-run report to a JSON file
    #[arg(long, requires = "dry_run")]
    pub output: Option<PathBuf>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(flatten)]
    pub args: SyncArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Translate missing and changed keys for target languages
    Sync(SyncCommand),
    /// Initialize a new linguasync.config.json configuration file
    Init,
}
