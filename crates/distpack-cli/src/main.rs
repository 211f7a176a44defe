//! distpack CLI - Command-line utility that stages and packages plugin
//! releases.

mod cli;
mod commands;
mod error;
mod output;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use std::env;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);
    let root = env::current_dir().context("failed to get current directory")?;
    tracing::debug!(root = %root.display(), "project root");

    match &cli.command {
        cli::Commands::Stage => commands::stage::execute(&root, &*formatter),
        cli::Commands::Package => commands::package::execute(&root, &*formatter),
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flags.
fn init_logging(verbose: bool, quiet: bool) {
    let default = if quiet {
        "distpack=warn,distpack_core=warn"
    } else if verbose {
        "distpack=debug,distpack_core=debug"
    } else {
        "distpack=info,distpack_core=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
