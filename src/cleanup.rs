//! Single-value text normalization
//!
//! Raw answer values arrive as list-like text (`['Alice', 'Bob']`) produced by
//! the survey export. This module strips one layer of that encoding so the
//! decoders downstream can work with bare text, and renders raw JSON values
//! into the same list-like convention in the first place.

use serde_json::Value;

/// Strip one layer of list-text quoting from a value.
///
/// Removes one leading `[` and one trailing `]` if present, then one leading
/// and one trailing quote character (single or double) if present. Single
/// layer only, not recursive. Empty input is returned unchanged.
///
/// Applied both to freshly isolated answer values and again to decoded
/// nomination slots, where splitting leaves residual quotes behind.
pub fn cleanup_value(x: &str) -> String {
    let mut temp = x;

    if let Some(rest) = temp.strip_prefix('[') {
        temp = rest;
    }
    if let Some(rest) = temp.strip_suffix(']') {
        temp = rest;
    }

    if let Some(rest) = temp.strip_prefix('\'').or_else(|| temp.strip_prefix('"')) {
        temp = rest;
    }
    if let Some(rest) = temp.strip_suffix('\'').or_else(|| temp.strip_suffix('"')) {
        temp = rest;
    }

    temp.to_string()
}

/// Render a JSON value in the export's list-like text convention.
///
/// Strings are single-quoted, booleans read `True`/`False`, null reads
/// `None`, arrays are bracketed with `, ` separators. This is the shape the
/// nomination and race decoders were built against, so the renderer must
/// match it exactly.
pub fn list_text(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(list_text).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("'{}': {}", k, list_text(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

/// Render a JSON value as bare cell text for tabular output.
///
/// Unlike [`list_text`], strings are unquoted; this is used for ping and
/// device attributes that never pass through the decoders.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => list_text(other),
    }
}
