//! CLI definitions for the quiz solver.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Quiz solver CLI.
#[derive(Parser, Debug)]
#[command(name = "quizsolver")]
#[command(about = "Autonomous data-science quiz solver service")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "quizsolver.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum Commands {
    /// Run the API server in foreground (default)
    Run {
        /// Server host (overrides config and HOST)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Load and validate the configuration, then exit
    CheckConfig,
}

impl Cli {
    /// The subcommand to run, `run` when none was given.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run {
            host: None,
            port: None,
        })
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
