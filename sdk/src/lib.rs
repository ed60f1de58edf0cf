//! prototext
//!
//! This crate is the user-facing surface of the prototext codec:
//!
//! - Re-exports of the schema model and the codec entry points
//! - File and reader entry points (read everything, delegate to the
//!   string parser)
//! - A helper that renders a parsed value as pretty-printed JSON

use std::fs;
use std::io::Read;
use std::path::Path;

pub use prototext_codec::{
    generate_to_string, parse_from_string, schema_from_json, verify_schema, DuplicatePolicy,
    Location, ParseOptions, Parser, Scanner, TextError, UnknownFieldPolicy,
};
pub use prototext_schema::{Def, DefKind, Field, Schema, Value};

pub mod error {
    pub use prototext_codec::error::{Location, TextError};
}

pub mod schema {
    pub use prototext_schema::{Def, DefKind, Field, Schema, Value};
}

/// Parse one `message` from everything `reader` yields.
pub fn parse_from_reader<'a>(
    schema: &'a Schema,
    message: &str,
    mut reader: impl Read,
    options: &ParseOptions,
) -> Result<Value<'a>, TextError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_from_string(schema, message, &text, options)
}

/// Parse one `message` from the file at `path`.
pub fn parse_from_file<'a>(
    schema: &'a Schema,
    message: &str,
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<Value<'a>, TextError> {
    let file = fs::File::open(path)?;
    parse_from_reader(schema, message, file, options)
}

/// Render a parsed value as pretty-printed JSON. Message fields come out
/// name-sorted so the rendering is deterministic; enum values become their
/// constant names and bytes become arrays of numbers.
pub fn value_to_json(value: &Value) -> Result<String, TextError> {
    serde_json::to_string_pretty(&json_value(value))
        .map_err(|e| TextError::Generate(e.to_string()))
}

fn json_value(value: &Value) -> serde_json::Value {
    use serde_json::json;

    match value {
        Value::Bool(v) => json!(v),
        Value::Int32(v) => json!(v),
        Value::Int64(v) => json!(v),
        Value::UInt32(v) => json!(v),
        Value::UInt64(v) => json!(v),
        Value::Float(v) => json!(v),
        Value::Double(v) => json!(v),
        Value::String(v) => json!(v),
        Value::Bytes(v) => json!(v),
        Value::Enum(_, constant) => json!(constant),
        Value::Repeated(entries) => {
            serde_json::Value::Array(entries.iter().map(json_value).collect())
        }
        Value::Message(_, fields) => {
            let mut map = serde_json::Map::new();
            let mut keys: Vec<_> = fields.keys().collect();
            keys.sort();
            for key in keys {
                map.insert((*key).to_owned(), json_value(&fields[key]));
            }
            serde_json::Value::Object(map)
        }
    }
}
