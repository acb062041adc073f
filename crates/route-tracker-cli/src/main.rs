mod cli;
mod commands;
mod input;

use anyhow::Result;
use clap::Parser;
use route_tracker_core::TrackerConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "route_tracker=debug"
    } else {
        "route_tracker=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    let config = TrackerConfig::load(&cli.config)?;
    debug!("Config: {:?}", config);

    match cli.command.unwrap_or(Command::Track { route: None }) {
        Command::Track { route } => commands::tracking::run(&config, route.as_deref()),
        Command::Stats { format } => commands::stats::run(&config, format),
        Command::Route { file } => commands::route::run(&config, file.as_deref()),
    }
}
