//! Top-level bridge error types.

use crate::normalize::NormalizeError;
use crate::resolver::ResolveError;

/// Everything that can go wrong between a parsed command line and the
/// JSON line on stdout.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Locating the fetch callable failed: missing source directory, or
    /// a completed scan with no candidate exposing the contract
    /// function.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The resolved fetcher raised while fetching. Deliberately not
    /// caught earlier: the bridge guarantees clarity about whether the
    /// contract callable was found, not about whether it succeeds.
    /// The cause is part of the message, not a separate source, so
    /// chain reporters print it once.
    #[error("fetch_departures failed: {0}")]
    Fetch(mlua::Error),

    /// The fetch result contained a value with no JSON representation.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// Encoding the normalized value failed. The normalizer only
    /// produces encodable values, so this indicates a bug.
    #[error("failed to encode result as JSON: {0}")]
    Json(#[from] serde_json::Error),
}
