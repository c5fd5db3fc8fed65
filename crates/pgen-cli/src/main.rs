//! CLI entrypoint for pgen.

mod check;
mod cli;
mod config;
mod parse;
mod tokens;

use anyhow::Context;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use config::Config;
use parse::ParseOptions;

const DEFAULT_FILTER: &str = "warn";

fn main() -> anyhow::Result<()> {
    match run() {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();
    let root = std::env::current_dir().context("failed to resolve working directory")?;
    let config = Config::load(&root, cli.config.as_deref());
    init_logging(cli.verbose, config.log_filter.as_deref());
    for warning in &config.warnings {
        warn!("{warning}");
    }

    match cli.command {
        Command::Check { grammar } => check::run(&grammar).map(|()| true),
        Command::Tokens { file, format } => {
            tokens::run(&file, format.unwrap_or(config.format), config.ranges).map(|()| true)
        }
        Command::Parse {
            file,
            grammar,
            start,
            format,
        } => parse::run(&ParseOptions::new(file, grammar, start, format, &config)),
    }
}

/// `RUST_LOG` wins, then `--verbose`, then `[log] filter`.
fn init_logging(verbose: bool, configured: Option<&str>) {
    let directive = if verbose {
        "debug"
    } else {
        configured.unwrap_or(DEFAULT_FILTER)
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
