//! Quiz Solver
//!
//! Main entry point: loads configuration, sets up logging and serves the
//! quiz API.

mod cli;
mod server;

use clap::Parser;
use tracing::{error, info, warn};

use quizsolver_config::{Config, ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command() {
        Commands::Run { host, port } => {
            let mut config = ConfigLoader::resolve(Some(&cli.config))?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let log_file = server::init_tracing(&config.logging)?;
            validate(&config)?;
            server::run_server(config, &log_file).await
        }
        Commands::CheckConfig => {
            let config = ConfigLoader::resolve(Some(&cli.config))?;
            let warnings = ConfigValidator::validate(&config).into_result()?;
            for warning in &warnings {
                println!("warning: {}: {}", warning.path, warning.message);
            }
            println!(
                "Configuration OK: {}:{} as {}",
                config.server.host, config.server.port, config.student.email
            );
            Ok(())
        }
    }
}

/// Log warnings and fail on errors.
fn validate(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match ConfigValidator::validate(config).into_result() {
        Ok(warnings) => {
            for warning in warnings {
                warn!(path = %warning.path, "{}", warning.message);
            }
            info!("Configuration validated");
            Ok(())
        }
        Err(e) => {
            error!("Invalid configuration: {}", e);
            Err(e.into())
        }
    }
}
