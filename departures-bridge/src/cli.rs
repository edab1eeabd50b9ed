//! Command-line argument handling.
//!
//! The interface is deliberately tiny: one positional stop name and an
//! optional `--source-dir` pointing at the fetcher module directory.
//! Argument errors exit with code 2 and a usage line on stderr.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{BridgeConfig, DEFAULT_SOURCE_DIR};

/// Query the external departures fetcher for one stop.
#[derive(Debug, Parser)]
#[command(name = "departures-bridge")]
pub struct Cli {
    /// Stop to query. Free-form text; not validated beyond presence.
    pub stop_name: String,

    /// Directory scanned for fetcher candidate modules.
    #[arg(long, default_value = DEFAULT_SOURCE_DIR)]
    pub source_dir: PathBuf,
}

impl Cli {
    /// Bridge configuration implied by these arguments.
    pub fn config(&self) -> BridgeConfig {
        BridgeConfig::new(self.source_dir.clone())
    }
}

/// Parse the process arguments, exiting with code 2 and a usage message
/// on stderr when they are invalid.
pub fn parse() -> Cli {
    Cli::parse()
}
