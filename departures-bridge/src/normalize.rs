//! Rewriting an arbitrary fetch result into a JSON value.
//!
//! The fetcher's return value has no fixed shape: nested tables,
//! scalars, and date/time userdata to arbitrary depth. [`normalize`]
//! walks the value recursively and rewrites it into a
//! [`serde_json::Value`], applying a small set of type-directed rules.

use mlua::{AnyUserData, Lua, Table, Value};
use serde_json::{Map, Number};

/// A value in the fetch result with no JSON representation.
///
/// `normalize` is total over the shapes a well-behaved fetcher returns.
/// Everything else is rejected here, at the boundary, instead of
/// letting something that is not JSON reach stdout.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// NaN or infinity.
    #[error("non-finite number {0} is not representable in JSON")]
    NonFiniteNumber(f64),

    /// Lua strings are byte strings; JSON strings are UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// A table key that has no textual coercion (table, function, ...).
    #[error("table key of type {0} cannot become a JSON object key")]
    UnsupportedKey(&'static str),

    /// A value outside the fetch result data model.
    #[error("value of type {0} is not representable in JSON")]
    Unsupported(&'static str),

    /// The interpreter failed while walking the value (for example an
    /// `isoformat` method raised).
    #[error("fetch result could not be converted: {0}")]
    Lua(#[from] mlua::Error),
}

/// Recursively rewrite `value` into a JSON value.
///
/// Conversion rules, most specific first:
///
/// 1. a table whose keys are exactly the integers `1..=n` becomes an
///    array, elements in key order;
/// 2. any other table becomes an object, scalar keys coerced to their
///    textual form;
/// 3. userdata exposing a zero-argument `isoformat` method becomes the
///    string that method returns;
/// 4. nil, booleans, integers, finite floats, and UTF-8 strings pass
///    through unchanged.
///
/// Tables are classified before the `isoformat` probe runs, so a table
/// that happens to contain an `isoformat` entry is still a mapping.
/// Recursion depth is bounded only by the shape of the value; cyclic
/// tables are out of scope.
pub fn normalize(lua: &Lua, value: &Value) -> Result<serde_json::Value, NormalizeError> {
    match value {
        Value::Nil => Ok(serde_json::Value::Null),
        Value::Boolean(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Integer(i) => Ok(serde_json::Value::Number(Number::from(*i))),
        Value::Number(n) => Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .ok_or(NormalizeError::NonFiniteNumber(*n)),
        Value::String(s) => Ok(serde_json::Value::String(utf8(s)?)),
        Value::Table(table) => normalize_table(lua, table),
        Value::UserData(ud) => match textual_conversion(lua, ud)? {
            Some(text) => Ok(serde_json::Value::String(text)),
            None => Err(NormalizeError::Unsupported("userdata")),
        },
        other => Err(NormalizeError::Unsupported(other.type_name())),
    }
}

fn normalize_table(lua: &Lua, table: &Table) -> Result<serde_json::Value, NormalizeError> {
    let mut pairs = Vec::new();
    for pair in table.clone().pairs::<Value, Value>() {
        pairs.push(pair?);
    }

    if let Some(items) = as_sequence(&pairs) {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(normalize(lua, item)?);
        }
        return Ok(serde_json::Value::Array(out));
    }

    let mut out = Map::new();
    for (key, value) in &pairs {
        out.insert(coerce_key(key)?, normalize(lua, value)?);
    }
    Ok(serde_json::Value::Object(out))
}

/// A table is a sequence when its keys are exactly the integers
/// `1..=n`. Returns the values ordered by key, or `None` for mappings.
///
/// An empty table classifies as an empty sequence; Lua cannot
/// distinguish it from an empty mapping, and departure lists are the
/// dominant shape.
fn as_sequence<'a>(pairs: &'a [(Value, Value)]) -> Option<Vec<&'a Value>> {
    let mut indexed: Vec<(i64, &'a Value)> = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        match key {
            Value::Integer(i) if *i >= 1 => indexed.push((*i, value)),
            _ => return None,
        }
    }
    indexed.sort_by_key(|(i, _)| *i);

    let consecutive = indexed
        .iter()
        .enumerate()
        .all(|(pos, (i, _))| *i == pos as i64 + 1);
    consecutive.then(|| indexed.into_iter().map(|(_, v)| v).collect())
}

/// Coerce a scalar table key to the text it takes as a JSON object key.
fn coerce_key(key: &Value) -> Result<String, NormalizeError> {
    match key {
        Value::String(s) => utf8(s),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Number(n) if n.is_finite() => Ok(n.to_string()),
        Value::Number(n) => Err(NormalizeError::NonFiniteNumber(*n)),
        Value::Boolean(b) => Ok(b.to_string()),
        other => Err(NormalizeError::UnsupportedKey(other.type_name())),
    }
}

fn utf8(s: &mlua::String) -> Result<String, NormalizeError> {
    let bytes = s.as_bytes();
    std::str::from_utf8(&bytes)
        .map(str::to_owned)
        .map_err(|_| NormalizeError::InvalidUtf8)
}

/// Probe userdata for a zero-argument `isoformat` method and invoke it.
///
/// The lookup goes through the interpreter so it honors whatever
/// `__index` arrangement the value carries, the same way a fetcher
/// would write `value:isoformat()`.
const ISOFORMAT_PROBE: &str = r#"
local value = ...
local ok, method = pcall(function() return value.isoformat end)
if ok and type(method) == "function" then
    return method(value)
end
return nil
"#;

fn textual_conversion(lua: &Lua, ud: &AnyUserData) -> Result<Option<String>, NormalizeError> {
    let text: Option<mlua::String> = lua
        .load(ISOFORMAT_PROBE)
        .set_name("isoformat probe")
        .call(ud.clone())?;
    text.map(|s| utf8(&s)).transpose()
}
