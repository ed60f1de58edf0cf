use crate::error::TextError;
use crate::utils::quote;
use crate::verifier::{verify_schema, NATIVE_TYPES};
use prototext_schema::{Def, DefKind, Field, Schema, TYPE_BOOL};
use serde::Deserialize;

// The on-disk schema description. Type references are textual here and get
// resolved to index-based ids before the Schema is built, so the raw form
// never leaks past this module.

#[derive(Deserialize)]
struct RawSchema {
    defs: Vec<RawDef>,
}

#[derive(Deserialize)]
struct RawDef {
    name: String,
    kind: String,
    #[serde(default)]
    oneofs: Vec<String>,
    #[serde(default)]
    fields: Vec<RawField>,
    #[serde(default)]
    constants: Vec<RawConstant>,
}

#[derive(Deserialize)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    type_: String,
    #[serde(default)]
    repeated: bool,
    #[serde(default)]
    oneof: Option<String>,
    number: i32,
}

#[derive(Deserialize)]
struct RawConstant {
    name: String,
    number: i32,
}

/// Build a verified [`Schema`] from its JSON description.
///
/// ```
/// let schema = prototext_codec::schema_from_json(r#"{
///     "defs": [
///         {"name": "Person", "kind": "message", "fields": [
///             {"name": "name", "type": "string", "number": 1},
///             {"name": "age", "type": "uint32", "number": 2}
///         ]}
///     ]
/// }"#).unwrap();
/// assert!(schema.def("Person").is_some());
/// ```
pub fn schema_from_json(text: &str) -> Result<Schema, TextError> {
    let raw: RawSchema = serde_json::from_str(text)
        .map_err(|e| TextError::Schema(format!("invalid schema JSON: {}", e)))?;

    let mut defs = Vec::with_capacity(raw.defs.len());
    for raw_def in &raw.defs {
        let kind = match raw_def.kind.as_str() {
            "message" => DefKind::Message,
            "enum" => DefKind::Enum,
            other => {
                return Err(TextError::Schema(format!(
                    "definition {} has invalid kind {}",
                    quote(&raw_def.name),
                    quote(other)
                )))
            }
        };

        let fields = match kind {
            DefKind::Enum => {
                if !raw_def.fields.is_empty() {
                    return Err(TextError::Schema(format!(
                        "enum {} must declare constants, not fields",
                        quote(&raw_def.name)
                    )));
                }
                raw_def
                    .constants
                    .iter()
                    .map(|constant| Field {
                        name: constant.name.clone(),
                        type_id: 0,
                        repeated: false,
                        oneof_index: None,
                        number: constant.number,
                    })
                    .collect()
            }
            DefKind::Message => {
                if !raw_def.constants.is_empty() {
                    return Err(TextError::Schema(format!(
                        "message {} must declare fields, not constants",
                        quote(&raw_def.name)
                    )));
                }
                let mut fields = Vec::with_capacity(raw_def.fields.len());
                for raw_field in &raw_def.fields {
                    fields.push(Field {
                        name: raw_field.name.clone(),
                        type_id: resolve_type(&raw.defs, &raw_field.type_)?,
                        repeated: raw_field.repeated,
                        oneof_index: resolve_oneof(raw_def, raw_field)?,
                        number: raw_field.number,
                    });
                }
                fields
            }
        };

        defs.push(Def::with_oneofs(
            raw_def.name.clone(),
            kind,
            raw_def.oneofs.clone(),
            fields,
        ));
    }

    let schema = Schema::new(defs);
    verify_schema(&schema)?;
    Ok(schema)
}

/// Resolve a textual type name: a scalar from the native table, or the
/// index of another definition.
fn resolve_type(defs: &[RawDef], name: &str) -> Result<i32, TextError> {
    if let Some(position) = NATIVE_TYPES.iter().position(|native| *native == name) {
        // Native ids count down from TYPE_BOOL in table order.
        return Ok(TYPE_BOOL - position as i32);
    }
    match defs.iter().position(|def| def.name == name) {
        Some(index) => Ok(index as i32),
        None => Err(TextError::Schema(format!(
            "the type {} is not defined",
            quote(name)
        ))),
    }
}

fn resolve_oneof(def: &RawDef, field: &RawField) -> Result<Option<usize>, TextError> {
    let group = match &field.oneof {
        None => return Ok(None),
        Some(group) => group,
    };
    match def.oneofs.iter().position(|name| name == group) {
        Some(index) => Ok(Some(index)),
        None => Err(TextError::Schema(format!(
            "field {} names the undeclared oneof {}",
            quote(&field.name),
            quote(group)
        ))),
    }
}
