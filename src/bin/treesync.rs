//! treesync CLI Binary
//!
//! Command-line interface for browsing and mutating a remote git-backed workspace.

use anyhow::Context;
use clap::Parser;
use std::process;
use tracing::{error, info};
use treesync::cli::{exit_code, map_error, Cli, RunContext};
use treesync::config::ConfigLoader;
use treesync::logging::{init_logging, LoggingConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("treesync CLI starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone())
        .with_context(|| format!("loading configuration from {}", cli.workspace.display()))
    {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error initializing client: {:#}", e);
            eprintln!("{:#}", e);
            process::exit(2);
        }
    };

    match context.execute(&cli.command).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(exit_code(&e));
        }
    }
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }

    config
}
