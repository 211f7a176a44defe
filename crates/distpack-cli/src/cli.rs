//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "distpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a clean, filtered release tree in ./dist
    Stage,
    /// Compress ./dist into <name>-<version>.zip
    Package,
}
