//! Bridge between an orchestration process and an externally
//! maintained departures fetcher.
//!
//! Given a transit stop name, the bridge locates a `fetch_departures`
//! function inside a directory of independently versioned fetcher
//! modules, invokes it, and emits the result as a single line of JSON
//! on standard output. The fetcher is free to rearrange its files or
//! rewrite its internals; the only contract is that one module keeps
//! exposing that function.

pub mod cli;
pub mod config;
pub mod error;
pub mod normalize;
pub mod resolver;
pub mod runtime;

use serde::Serialize;

pub use config::BridgeConfig;
pub use error::BridgeError;

/// Resolve the fetch callable, invoke it with `stop_name`, and encode
/// the normalized result.
///
/// Returns the one line of JSON to print. Structural problems (missing
/// directory, no candidate exposing the contract function) come back as
/// resolution errors; a failure inside the fetcher itself propagates as
/// [`BridgeError::Fetch`] rather than being swallowed.
pub fn run(config: &BridgeConfig, stop_name: &str) -> Result<String, BridgeError> {
    let handle = resolver::resolve(&config.source_dir)?;
    tracing::debug!(
        source = %handle.source().display(),
        stop = stop_name,
        "invoking fetcher"
    );
    let result = handle.call(stop_name).map_err(BridgeError::Fetch)?;
    let normalized = normalize::normalize(handle.lua(), &result)?;
    encode(&normalized)
}

/// Single-line JSON with `", "` between entries and `": "` after keys,
/// the format existing consumers of the bridge's output expect.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> std::io::Result<()>
    where
        W: ?Sized + std::io::Write,
    {
        if !first {
            writer.write_all(b", ")?;
        }
        Ok(())
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> std::io::Result<()>
    where
        W: ?Sized + std::io::Write,
    {
        if !first {
            writer.write_all(b", ")?;
        }
        Ok(())
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> std::io::Result<()>
    where
        W: ?Sized + std::io::Write,
    {
        writer.write_all(b": ")
    }
}

fn encode(value: &serde_json::Value) -> Result<String, BridgeError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut ser)?;
    // serde_json output is always UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
