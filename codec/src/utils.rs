use serde_json;

/// Render `text` as a double-quoted, escaped literal for diagnostics.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{:?}", text))
}
