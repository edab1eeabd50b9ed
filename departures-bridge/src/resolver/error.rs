//! Resolver error types.

use std::path::PathBuf;

/// Structural failures while locating the fetch callable.
///
/// These are the failures the bridge promises to report clearly: a
/// missing source directory, an unscannable one, and a completed scan
/// that found no contract function. Failures *inside* individual
/// candidate modules are not errors at this level; broken candidates
/// are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The configured fetcher source directory does not exist.
    #[error("fetcher source directory not found: {}", .0.display())]
    SourceDirMissing(PathBuf),

    /// The directory exists but could not be enumerated.
    #[error("failed to scan {}: {source}", .dir.display())]
    Scan {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No candidate module exposes the contract function.
    #[error(
        "no candidate in {} exposes a callable fetch_departures(stop_name)",
        .0.display()
    )]
    NotFound(PathBuf),
}
