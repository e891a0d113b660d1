//! Basket Scout - CDN basket discovery for marketplace product cards
//! 
//! Maps catalog volumes to the numbered basket hosts that serve them with a
//! logarithmic number of existence probes, and downloads product cards from
//! the resolved baskets.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod cli;
pub mod commands;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::{init_logging_with_config, log_system_info};

/// Parse the command line, load configuration, start logging and run the
/// requested command
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    // Reported once the subscriber is installed
    let (config, origin) = manager.load_config_with_origin().await?;

    init_logging_with_config(&config.logging)?;
    log_system_info();
    origin.log(manager.config_path());

    commands::dispatch(cli.command, config).await
}
