use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "route-tracker")]
#[command(about = "Live route tracker for Assassin's Creed IV: Black Flag", version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = "route-tracker.toml", env = "ROUTE_TRACKER_CONFIG")]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Track route progress while the game runs (default)
    Track {
        /// Route file to load instead of searching the Routes folder
        #[arg(short, long)]
        route: Option<PathBuf>,
    },
    /// Read the stats once and print them
    Stats {
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Parse a route file and list its entries
    Route {
        /// Route file (searched for when omitted)
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Tsv,
    Json,
}
