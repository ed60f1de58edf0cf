use crate::error::TextError;
use crate::utils::quote;
use prototext_schema::{scalar_name, DefKind, Schema};

/// Scalar type names accepted by the JSON loader, paired with their ids.
pub const NATIVE_TYPES: [&str; 9] = [
    "bool", "int32", "int64", "uint32", "uint64", "float", "double", "string", "bytes",
];

/// Returns `Ok(())` if the schema is internally consistent, or
/// `Err(TextError::Schema(_))` naming the first problem found.
///
/// The parser and generator assume a verified schema: every `type_id`
/// resolves, every oneof index is in bounds, and lookup maps are
/// collision-free. Callers that build schemas in code should run this once
/// before parsing with them; the JSON loader runs it automatically.
pub fn verify_schema(schema: &Schema) -> Result<(), TextError> {
    // 1) Check duplicate / reserved type names
    let mut defined_types: Vec<&str> = NATIVE_TYPES.to_vec();
    for def in &schema.defs {
        if defined_types.contains(&def.name.as_str()) {
            if NATIVE_TYPES.contains(&def.name.as_str()) {
                return Err(TextError::Schema(format!(
                    "the type name {} is reserved",
                    quote(&def.name)
                )));
            }
            return Err(TextError::Schema(format!(
                "the type {} is defined twice",
                quote(&def.name)
            )));
        }
        defined_types.push(def.name.as_str());
    }

    // 2) Check fields inside each definition
    for def in &schema.defs {
        let mut names: Vec<&str> = Vec::new();
        let mut numbers: Vec<i32> = Vec::new();

        for field in &def.fields {
            if names.contains(&field.name.as_str()) {
                return Err(TextError::Schema(format!(
                    "{} declares the field {} twice",
                    quote(&def.name),
                    quote(&field.name)
                )));
            }
            names.push(field.name.as_str());

            match def.kind {
                DefKind::Enum => {
                    if numbers.contains(&field.number) {
                        return Err(TextError::Schema(format!(
                            "enum {} uses the number {} twice",
                            quote(&def.name),
                            field.number
                        )));
                    }
                    numbers.push(field.number);
                    if field.repeated || field.oneof_index.is_some() {
                        return Err(TextError::Schema(format!(
                            "enum constant {} cannot be repeated or belong to a oneof",
                            quote(&field.name)
                        )));
                    }
                }
                DefKind::Message => {
                    if field.type_id < 0 && scalar_name(field.type_id).is_none() {
                        return Err(TextError::Schema(format!(
                            "field {} has an unknown scalar type id {}",
                            quote(&field.name),
                            field.type_id
                        )));
                    }
                    if field.type_id >= 0 && field.type_id as usize >= schema.defs.len() {
                        return Err(TextError::Schema(format!(
                            "field {} references the undefined type #{}",
                            quote(&field.name),
                            field.type_id
                        )));
                    }
                    if let Some(group) = field.oneof_index {
                        if group >= def.oneofs.len() {
                            return Err(TextError::Schema(format!(
                                "field {} references the undefined oneof #{}",
                                quote(&field.name),
                                group
                            )));
                        }
                        if field.repeated {
                            return Err(TextError::Schema(format!(
                                "oneof member {} cannot be repeated",
                                quote(&field.name)
                            )));
                        }
                    }
                }
            }
        }

        if def.kind == DefKind::Enum && !def.oneofs.is_empty() {
            return Err(TextError::Schema(format!(
                "enum {} cannot declare oneofs",
                quote(&def.name)
            )));
        }
    }

    Ok(())
}
