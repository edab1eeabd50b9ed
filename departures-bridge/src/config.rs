//! Bridge configuration.

use std::path::PathBuf;

/// Default fetcher source directory, relative to the working directory.
///
/// Matches the layout the bridge is deployed against: a `basttrafik`
/// checkout sitting beside the caller, with its modules under `src/`.
pub const DEFAULT_SOURCE_DIR: &str = "basttrafik/src";

/// Configuration for one bridge invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Directory scanned for fetcher candidate modules.
    pub source_dir: PathBuf,
}

impl BridgeConfig {
    /// Create a configuration with an explicit source directory.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
        }
    }
}
