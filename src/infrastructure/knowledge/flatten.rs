//! Flattening of structured documents into embeddable text lines.

use serde_json::Value;

/// Flatten a JSON document into `"path: value"` lines.
///
/// Object keys join with `.`, array elements render as `[n]` with 1-based
/// indices, and `null` values produce no line. The result reads like prose
/// enough for the lexical embedder to work with.
pub fn flatten_json(value: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    walk(value, "", &mut lines);
    lines
}

fn walk(value: &Value, prefix: &str, lines: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk(item, &format!("{prefix}[{}]", index + 1), lines);
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                let next = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                walk(child, &next, lines);
            }
        }
        Value::String(text) => lines.push(format!("{prefix}: {text}")),
        other => lines.push(format!("{prefix}: {other}")),
    }
}
