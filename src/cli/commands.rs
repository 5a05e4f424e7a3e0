//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pipeline deployment specification tool
#[derive(Parser, Debug)]
#[command(name = "flowspec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a specification file (schema, upgrade, DAG)
    Validate {
        /// Specification file (JSON or YAML)
        file: PathBuf,

        /// Validate against this spec version instead of the declared one
        #[arg(long)]
        spec_version: Option<String>,
    },

    /// Upgrade a specification to the latest spec version
    Upgrade {
        /// Specification file (JSON or YAML)
        file: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the topology of a specification
    Inspect {
        /// Specification file (JSON or YAML)
        file: PathBuf,
    },

    /// List supported spec versions
    Versions,

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Replay fixture records configured in each application's config
        #[arg(long)]
        fixtures: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
