use crate::error::TextError;
use crate::utils::quote;
use prototext_schema::{
    Def, DefKind, Field, Schema, Value, TYPE_BOOL, TYPE_BYTES, TYPE_DOUBLE, TYPE_FLOAT,
    TYPE_INT32, TYPE_INT64, TYPE_STRING, TYPE_UINT32, TYPE_UINT64,
};
use std::collections::HashMap;

/// Serialize a populated message back to canonical text.
///
/// Fields are emitted in descriptor declaration order, never in population
/// order, so two field-identical values always generate byte-identical
/// text. Absent fields and empty repeated fields are skipped. Generation
/// is all-or-nothing: if the value doesn't conform to its descriptor the
/// call returns an error and no partial string.
pub fn generate_to_string(schema: &Schema, value: &Value) -> Result<String, TextError> {
    let (name, fields) = match value {
        Value::Message(name, fields) => (*name, fields),
        other => {
            return Err(TextError::Generate(format!(
                "top-level value is {}, not a message",
                kind_name(other)
            )))
        }
    };
    let def = schema
        .def(name)
        .ok_or_else(|| TextError::Generate(format!("no definition named {}", quote(name))))?;
    if def.kind != DefKind::Message {
        return Err(TextError::Generate(format!(
            "{} is an enum, not a message",
            quote(name)
        )));
    }

    let mut out = String::new();
    generate_body(schema, def, fields, 0, &mut out)?;
    Ok(out)
}

fn generate_body(
    schema: &Schema,
    def: &Def,
    fields: &HashMap<&str, Value>,
    level: usize,
    out: &mut String,
) -> Result<(), TextError> {
    // A stray key would silently vanish from the walk below; reject it
    // up front so output either reflects the whole value or nothing.
    for key in fields.keys() {
        if !def.field_name_to_index.contains_key(*key) {
            return Err(TextError::Generate(format!(
                "message {} has no field {}",
                quote(&def.name),
                quote(key)
            )));
        }
    }

    for field in &def.fields {
        let value = match fields.get(field.name.as_str()) {
            None => continue,
            Some(value) => value,
        };
        match value {
            Value::Repeated(entries) => {
                if !field.repeated {
                    return Err(TextError::Generate(format!(
                        "singular field {} holds repeated entries",
                        quote(&field.name)
                    )));
                }
                for entry in entries {
                    generate_field(schema, field, entry, level, out)?;
                }
            }
            single => {
                if field.repeated {
                    return Err(TextError::Generate(format!(
                        "repeated field {} holds a single value",
                        quote(&field.name)
                    )));
                }
                generate_field(schema, field, single, level, out)?;
            }
        }
    }
    Ok(())
}

fn generate_field(
    schema: &Schema,
    field: &Field,
    value: &Value,
    level: usize,
    out: &mut String,
) -> Result<(), TextError> {
    let indent = " ".repeat(level);

    if field.type_id >= 0 && schema.defs[field.type_id as usize].kind == DefKind::Message {
        let nested = &schema.defs[field.type_id as usize];
        let (name, nested_fields) = match value {
            Value::Message(name, nested_fields) => (*name, nested_fields),
            other => {
                return Err(TextError::Generate(format!(
                    "field {} expects message {}, found {}",
                    quote(&field.name),
                    quote(&nested.name),
                    kind_name(other)
                )))
            }
        };
        if name != nested.name {
            return Err(TextError::Generate(format!(
                "field {} expects message {}, found message {}",
                quote(&field.name),
                quote(&nested.name),
                quote(name)
            )));
        }
        out.push_str(&format!("{}{} {{\n", indent, field.name));
        generate_body(schema, nested, nested_fields, level + 2, out)?;
        out.push_str(&format!("{}}}\n", indent));
        return Ok(());
    }

    let text = scalar_text(schema, field, value)?;
    out.push_str(&format!("{}{}: {}\n", indent, field.name, text));
    Ok(())
}

fn scalar_text(schema: &Schema, field: &Field, value: &Value) -> Result<String, TextError> {
    let text = match (field.type_id, value) {
        (TYPE_BOOL, Value::Bool(v)) => if *v { "true" } else { "false" }.to_owned(),
        (TYPE_INT32, Value::Int32(v)) => v.to_string(),
        (TYPE_INT64, Value::Int64(v)) => v.to_string(),
        (TYPE_UINT32, Value::UInt32(v)) => v.to_string(),
        (TYPE_UINT64, Value::UInt64(v)) => v.to_string(),
        // `{}` on floats is the shortest representation that parses back
        // to the identical bits, which is exactly what round-tripping needs.
        (TYPE_FLOAT, Value::Float(v)) => format!("{}", v),
        (TYPE_DOUBLE, Value::Double(v)) => format!("{}", v),
        (TYPE_STRING, Value::String(v)) => quote_bytes(v.as_bytes()),
        (TYPE_BYTES, Value::Bytes(v)) => quote_bytes(v),
        (type_id, Value::Enum(enum_name, constant)) if type_id >= 0 => {
            let def = &schema.defs[type_id as usize];
            if def.kind != DefKind::Enum || def.name != *enum_name {
                return Err(TextError::Generate(format!(
                    "field {} expects enum {}, found enum {}",
                    quote(&field.name),
                    quote(&def.name),
                    quote(enum_name)
                )));
            }
            if def.field_name_to_index.get(*constant).is_none() {
                return Err(TextError::Generate(format!(
                    "enum {} has no constant {}",
                    quote(&def.name),
                    quote(constant)
                )));
            }
            (*constant).to_owned()
        }
        (_, other) => {
            return Err(TextError::Generate(format!(
                "field {} holds a mismatched {} value",
                quote(&field.name),
                kind_name(other)
            )))
        }
    };
    Ok(text)
}

/// Quote and escape a string/bytes payload so it re-scans to the identical
/// byte sequence. The escape table is fixed: named escapes for the common
/// control characters, `\xHH` for everything else outside printable ASCII.
pub fn quote_bytes(payload: &[u8]) -> String {
    let mut out = String::with_capacity(payload.len() + 2);
    out.push('"');
    for &byte in payload {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7E => out.push(byte as char),
            _ => out.push_str(&format!("\\x{:02x}", byte)),
        }
    }
    out.push('"');
    out
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "bool",
        Value::Int32(_) => "int32",
        Value::Int64(_) => "int64",
        Value::UInt32(_) => "uint32",
        Value::UInt64(_) => "uint64",
        Value::Float(_) => "float",
        Value::Double(_) => "double",
        Value::String(_) => "string",
        Value::Bytes(_) => "bytes",
        Value::Repeated(_) => "repeated",
        Value::Enum(_, _) => "enum",
        Value::Message(_, _) => "message",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use prototext_schema::{Def, DefKind, Field};

    fn schema() -> Schema {
        Schema::new(vec![
            Def::new(
                "Species".to_owned(),
                DefKind::Enum,
                vec![
                    Field {
                        name: "CAT".to_owned(),
                        type_id: 0,
                        repeated: false,
                        oneof_index: None,
                        number: 0,
                    },
                    Field {
                        name: "DOG".to_owned(),
                        type_id: 0,
                        repeated: false,
                        oneof_index: None,
                        number: 1,
                    },
                ],
            ),
            Def::new(
                "Pet".to_owned(),
                DefKind::Message,
                vec![
                    Field {
                        name: "name".to_owned(),
                        type_id: TYPE_STRING,
                        repeated: false,
                        oneof_index: None,
                        number: 1,
                    },
                    Field {
                        name: "species".to_owned(),
                        type_id: 0,
                        repeated: false,
                        oneof_index: None,
                        number: 2,
                    },
                    Field {
                        name: "nicknames".to_owned(),
                        type_id: TYPE_STRING,
                        repeated: true,
                        oneof_index: None,
                        number: 3,
                    },
                    Field {
                        name: "friend".to_owned(),
                        type_id: 1,
                        repeated: false,
                        oneof_index: None,
                        number: 4,
                    },
                ],
            ),
        ])
    }

    #[test]
    fn test_generate_declaration_order() {
        let schema = schema();
        // Populate out of declaration order; output must not care.
        let mut pet = Value::message_of(&schema, "Pet").unwrap();
        pet.set("species", Value::Enum("Species", "DOG"));
        pet.set("name", Value::String("Rex".to_owned()));

        let text = generate_to_string(&schema, &pet).unwrap();
        assert_eq!(text, "name: \"Rex\"\nspecies: DOG\n");
    }

    #[test]
    fn test_generate_nested_and_repeated() {
        let schema = schema();
        let mut friend = Value::message_of(&schema, "Pet").unwrap();
        friend.set("name", Value::String("Mia".to_owned()));

        let mut pet = Value::message_of(&schema, "Pet").unwrap();
        pet.set("name", Value::String("Rex".to_owned()));
        pet.set(
            "nicknames",
            Value::Repeated(vec![
                Value::String("rexy".to_owned()),
                Value::String("wrecks".to_owned()),
            ]),
        );
        pet.set("friend", friend);

        let text = generate_to_string(&schema, &pet).unwrap();
        assert_eq!(
            text,
            "name: \"Rex\"\nnicknames: \"rexy\"\nnicknames: \"wrecks\"\nfriend {\n  name: \"Mia\"\n}\n"
        );
    }

    #[test]
    fn test_generate_skips_empty_repeated() {
        let schema = schema();
        let mut pet = Value::message_of(&schema, "Pet").unwrap();
        pet.set("nicknames", Value::Repeated(vec![]));
        assert_eq!(generate_to_string(&schema, &pet).unwrap(), "");
    }

    #[test]
    fn test_generate_is_deterministic() {
        let schema = schema();
        let mut pet = Value::message_of(&schema, "Pet").unwrap();
        pet.set("name", Value::String("Rex".to_owned()));
        pet.set("species", Value::Enum("Species", "CAT"));

        let first = generate_to_string(&schema, &pet).unwrap();
        let second = generate_to_string(&schema, &pet).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_rejects_stray_field() {
        let schema = schema();
        let mut pet = Value::message_of(&schema, "Pet").unwrap();
        pet.set("name", Value::String("Rex".to_owned()));
        pet.set("color", Value::String("brown".to_owned()));
        assert!(matches!(
            generate_to_string(&schema, &pet),
            Err(TextError::Generate(_))
        ));
    }

    #[test]
    fn test_generate_rejects_mismatched_kind() {
        let schema = schema();
        let mut pet = Value::message_of(&schema, "Pet").unwrap();
        pet.set("name", Value::UInt32(7));
        assert!(matches!(
            generate_to_string(&schema, &pet),
            Err(TextError::Generate(_))
        ));
    }

    #[test]
    fn test_quote_bytes_escapes() {
        assert_eq!(quote_bytes(b"plain"), "\"plain\"");
        assert_eq!(quote_bytes(b"a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(quote_bytes(b"\n\t\x01\xff"), "\"\\n\\t\\x01\\xff\"");
    }
}
