//! Locating the external fetch callable.
//!
//! The bridge has no compile-time knowledge of the fetcher: the
//! integration contract is purely conventional. A directory of modules
//! is scanned in filename order and the first one that defines a global
//! function named `fetch_departures` wins. Each candidate runs in its
//! own interpreter, so loading one module cannot affect another and a
//! broken module cannot poison the scan.

mod error;

pub use error::ResolveError;

use std::path::{Path, PathBuf};

use mlua::{Function, Lua, Value};

use crate::runtime;

/// Name of the contract function a fetcher module must define.
pub const FETCH_FN: &str = "fetch_departures";

/// Extension candidate modules must carry.
const SOURCE_EXTENSION: &str = "lua";

/// A resolved fetch callable, bound to the interpreter it lives in.
#[derive(Debug)]
pub struct FetchHandle {
    lua: Lua,
    func: Function,
    source: PathBuf,
}

impl FetchHandle {
    /// Invoke the fetcher with a stop name, returning whatever shape it
    /// produced. Errors raised inside the fetcher propagate untouched.
    pub fn call(&self, stop_name: &str) -> Result<Value, mlua::Error> {
        self.func.call(stop_name)
    }

    /// The interpreter the callable was loaded into.
    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Path of the module that provided the callable.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Scan `source_dir` for the first module exposing [`FETCH_FN`].
///
/// Candidates are considered in lexicographic filename order so
/// resolution is reproducible when several modules could match. Files
/// whose name starts with `_` are treated as private helpers and never
/// loaded. A candidate that fails to read, parse, or execute is logged
/// at warn level and skipped; the scan continues with the next one.
pub fn resolve(source_dir: &Path) -> Result<FetchHandle, ResolveError> {
    if !source_dir.is_dir() {
        return Err(ResolveError::SourceDirMissing(source_dir.to_path_buf()));
    }

    let scan_err = |source| ResolveError::Scan {
        dir: source_dir.to_path_buf(),
        source,
    };

    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(source_dir).map_err(scan_err)? {
        let path = entry.map_err(scan_err)?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            continue;
        }
        let private = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('_'));
        if private {
            continue;
        }
        candidates.push(path);
    }
    candidates.sort();

    for path in candidates {
        tracing::debug!(path = %path.display(), "considering fetcher candidate");
        match load_candidate(&path) {
            Ok(Some(handle)) => {
                tracing::debug!(path = %path.display(), "resolved {}", FETCH_FN);
                return Ok(handle);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "skipping broken fetcher candidate"
                );
            }
        }
    }

    Err(ResolveError::NotFound(source_dir.to_path_buf()))
}

/// Execute one candidate in a fresh interpreter and probe its globals
/// for the contract function.
///
/// `Ok(None)` means the module loaded fine but does not provide a
/// callable [`FETCH_FN`]; a global of any other type does not match,
/// mirroring a callability check.
fn load_candidate(path: &Path) -> Result<Option<FetchHandle>, CandidateError> {
    let chunk_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("candidate")
        .to_owned();
    let source = std::fs::read_to_string(path)?;

    let lua = runtime::fetcher_lua()?;
    lua.load(&source).set_name(chunk_name).exec()?;

    let value: Value = lua.globals().get(FETCH_FN)?;
    let func = match value {
        Value::Function(func) => func,
        Value::Nil => return Ok(None),
        other => {
            tracing::debug!(
                path = %path.display(),
                type_name = other.type_name(),
                "{} exists but is not callable",
                FETCH_FN
            );
            return Ok(None);
        }
    };

    Ok(Some(FetchHandle {
        lua,
        func,
        source: path.to_path_buf(),
    }))
}

/// Why one candidate was skipped. Only ever logged; never escapes the
/// scan.
#[derive(Debug, thiserror::Error)]
enum CandidateError {
    #[error("unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Lua(#[from] mlua::Error),
}
