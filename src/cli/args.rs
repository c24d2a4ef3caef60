//! CLI argument definitions using clap
//!
//! Commands:
//! - reeldb find --config <path> --entity <name> [--param k=v]... [--eager]
//! - reeldb count --config <path> --entity <name> [--param k=v]...
//! - reeldb get --config <path> --entity <name> --id <id>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// reeldb - criteria queries over a media catalog
#[derive(Parser, Debug)]
#[command(name = "reeldb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find one page of rows matching the filter parameters
    Find {
        /// Path to configuration file
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,

        /// Entity to query (film, episode, person)
        #[arg(long)]
        entity: String,

        /// Query parameter as key=value, e.g. title.contains=Matrix
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Load the entity's eager relations onto each row
        #[arg(long)]
        eager: bool,
    },

    /// Count rows matching the filter parameters
    Count {
        /// Path to configuration file
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,

        #[arg(long)]
        entity: String,

        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Fetch one row by id with its eager relations
    Get {
        /// Path to configuration file
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,

        #[arg(long)]
        entity: String,

        #[arg(long)]
        id: i64,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
