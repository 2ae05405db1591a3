use std::env;

use anyhow::{Context, Result};

use super::{
    args::{Arguments, Command},
    commands::{init::init, sync::sync},
    exit_status::ExitStatus,
};

/// Dispatch to the command handler.
pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Sync(cmd)) => sync(cmd),
        Some(Command::Init) => {
            let cwd = env::current_dir().context("Failed to determine the current directory")?;
            init(&cwd)
        }
        None => anyhow::bail!("No command provided. Use --help to see available commands."),
    }
}
