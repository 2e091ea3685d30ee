//! Loading chat exports
//!
//! Accepts Messenger-style JSON exports in either layout:
//!
//! ```text
//! [ {"sender_name": ..., "timestamp_ms": ..., "content": ...}, ... ]
//! { "participants": [...], "messages": [ {...}, ... ] }
//! ```
//!
//! Large conversations are split across several files; [`load_files`]
//! concatenates them in argument order.
//!
//! Each message is decoded on its own. A field with the wrong JSON type is
//! read as absent, so enrichment rejects just that record and the rest of
//! the file still loads. Numeric strings are accepted for `timestamp_ms`.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::RawMessage;

/// Decode an export from a JSON string.
pub fn parse_export(json: &str) -> Result<Vec<RawMessage>> {
    let items = match serde_json::from_str::<Value>(json)? {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("messages") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::ExportLayout(
                    "object has no `messages` array".to_string(),
                ))
            }
        },
        other => {
            return Err(Error::ExportLayout(format!(
                "expected an array or object, found {}",
                json_type(&other)
            )))
        }
    };

    Ok(items
        .iter()
        .enumerate()
        .map(|(index, item)| raw_message(index, item))
        .collect())
}

/// Read the known fields of one message, leaving mistyped ones empty.
fn raw_message(index: usize, item: &Value) -> RawMessage {
    let Some(fields) = item.as_object() else {
        tracing::warn!(index, found = json_type(item), "Message is not a JSON object");
        return RawMessage::default();
    };

    let text = |name: &str| match fields.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            tracing::warn!(
                index,
                field = name,
                found = json_type(other),
                "Ignoring mistyped field"
            );
            None
        }
    };

    let timestamp_ms = match fields.get("timestamp_ms") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => Some(n.clone()),
        Some(Value::String(s)) => s.trim().parse::<serde_json::Number>().ok().or_else(|| {
            tracing::warn!(index, value = %s, "Ignoring non-numeric timestamp_ms");
            None
        }),
        Some(other) => {
            tracing::warn!(
                index,
                field = "timestamp_ms",
                found = json_type(other),
                "Ignoring mistyped field"
            );
            None
        }
    };

    RawMessage {
        sender_name: text("sender_name"),
        timestamp_ms,
        content: text("content"),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read one export file.
pub fn load_file(path: &Path) -> Result<Vec<RawMessage>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Ingest {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let messages = parse_export(&content).map_err(|e| Error::Ingest {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::debug!(path = %path.display(), messages = messages.len(), "Loaded export file");
    Ok(messages)
}

/// Read and concatenate several export files.
pub fn load_files(paths: &[PathBuf]) -> Result<Vec<RawMessage>> {
    let mut all = Vec::new();
    for path in paths {
        all.extend(load_file(path)?);
    }
    tracing::info!(files = paths.len(), messages = all.len(), "Loaded exports");
    Ok(all)
}
