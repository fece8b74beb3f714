//! Command-line interface shared by `spreader-build` and `spreader-test`

pub mod commands;
pub mod output;

use anyhow::{Context, Result};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub use commands::{execute, run, PipelineKind, RunReport};

/// Build tooling for the spreader JavaScript package
#[derive(Debug, Parser, Clone)]
#[command(version)]
#[command(about = "Drive the CMake build of the spreader JavaScript package", long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Package root containing `.env`, `code/` and `cmake-build/` (default: current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// CMake executable
    #[arg(long, default_value = "cmake")]
    pub cmake: String,

    /// Kill a step that runs longer than this many seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub step_timeout: Option<u64>,

    /// Print the steps without running them
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, print the plan as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

/// Install the global logging subscriber (stderr)
pub fn init_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")
}
