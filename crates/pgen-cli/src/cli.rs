//! CLI definitions for pgen.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "pgen",
    version,
    about = "Check LL(1) parse tables and parse files with them",
    after_help = "Examples:\n  pgen check grammars/calc.json\n  pgen tokens input.txt\n  pgen parse input.txt --grammar grammars/calc.json --start file_input\n  pgen parse input.txt --format json"
)]
pub struct Cli {
    /// Config file (defaults to pgen.toml or .pgen.toml in the working directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Enable debug logging.
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and validate a grammar table, then print a summary.
    Check {
        /// Serialized grammar (JSON).
        grammar: PathBuf,
    },
    /// Print the tokens of a file.
    Tokens {
        /// Input file.
        file: PathBuf,
        /// Output format.
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Parse a file and print its tree.
    Parse {
        /// Input file.
        file: PathBuf,
        /// Serialized grammar (overrides `[grammar] path`).
        #[arg(long)]
        grammar: Option<PathBuf>,
        /// Start symbol name (overrides `[grammar] start`).
        #[arg(long)]
        start: Option<String>,
        /// Output format (overrides `[output] format`).
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

/// How trees and token lists are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented text.
    #[default]
    Tree,
    /// JSON on a single line.
    Json,
}
