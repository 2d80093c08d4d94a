//! CropMirror CLI
//!
//! # Usage
//!
//! ```bash
//! cropmirror run --source recordings --dest cropped --format ffv1 --report run.json
//! cropmirror mirror --source recordings --dest cropped
//! cropmirror verify --source recordings --dest cropped --format ffv1 --report run.json
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use cropmirror::app::container::DefaultAppContainer;
use cropmirror::cli::{commands, Cli, Commands};
use cropmirror::config_initialization::{initialize_configuration_hierarchy, CliOverrides};
use cropmirror::utils::logging::{init_logging, LoggingConfig};

/// Main entry point for the CropMirror CLI application
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = initialize_configuration_hierarchy(&CliOverrides {
        log_level: cli.log_level.clone(),
        config_file: cli.config.clone(),
    })
    .context("Invalid configuration")?;

    init_logging(&LoggingConfig::new(config.log_level.clone(), cli.log_format));
    info!(version = env!("CARGO_PKG_VERSION"), "Starting CropMirror");

    let container = DefaultAppContainer::new(&config).context("Failed to set up collaborators")?;

    let clean = match cli.command {
        Commands::Run(args) => commands::run(&container, args).await?,
        Commands::Mirror(args) => commands::mirror(&container, args).await?,
        Commands::Verify(args) => commands::verify(&container, args).await?,
    };

    if clean {
        info!("Completed successfully");
        Ok(ExitCode::SUCCESS)
    } else {
        error!("Completed with problems, see the summary above");
        Ok(ExitCode::FAILURE)
    }
}
