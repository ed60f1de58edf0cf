use std::collections::HashMap;

/// The two kinds of named definitions a [`Schema`] can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefKind {
    Enum,
    Message,
}

/// One field of a message definition, or one constant of an enum
/// definition.
///
/// `type_id` is negative for scalar types (the `TYPE_*` constants) and
/// otherwise an index into [`Schema::defs`], which is how enum and
/// nested-message references are expressed. Index-based references keep
/// recursive message types representable without ownership cycles. For enum
/// constants `type_id` is unused and `number` carries the constant's value.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub type_id: i32,
    pub repeated: bool,
    /// Index into the owning def's `oneofs` table for oneof members.
    pub oneof_index: Option<usize>,
    /// Field number for message fields, constant value for enum entries.
    pub number: i32,
}

/// A single named definition: a message type or an enum table.
///
/// Lookup maps are derived from `fields` at construction time and must not
/// be mutated afterwards; every parse and generate call relies on them.
#[derive(Clone, Debug, PartialEq)]
pub struct Def {
    pub name: String,
    pub kind: DefKind,
    pub fields: Vec<Field>,
    /// Oneof group names; meaningful for message defs only.
    pub oneofs: Vec<String>,
    pub field_name_to_index: HashMap<String, usize>,
    /// Constant value to field index; populated for enum defs only.
    pub field_value_to_index: HashMap<i32, usize>,
}

impl Def {
    pub fn new(name: String, kind: DefKind, fields: Vec<Field>) -> Def {
        Def::with_oneofs(name, kind, Vec::new(), fields)
    }

    pub fn with_oneofs(
        name: String,
        kind: DefKind,
        oneofs: Vec<String>,
        fields: Vec<Field>,
    ) -> Def {
        let mut field_name_to_index = HashMap::new();
        let mut field_value_to_index = HashMap::new();

        for (index, field) in fields.iter().enumerate() {
            field_name_to_index.insert(field.name.clone(), index);
            if kind == DefKind::Enum {
                field_value_to_index.insert(field.number, index);
            }
        }

        Def {
            name,
            kind,
            fields,
            oneofs,
            field_name_to_index,
            field_value_to_index,
        }
    }

    /// Look up a field (or enum constant) by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.field_name_to_index
            .get(name)
            .map(|index| &self.fields[*index])
    }
}

/// An immutable pool of definitions.
///
/// A schema is built once by the caller (in code, or through the codec's
/// JSON loader) and then only read: every lookup during parsing and
/// generation goes through `&self`, so one schema can back any number of
/// concurrent codec calls.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    pub defs: Vec<Def>,
    pub def_name_to_index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(defs: Vec<Def>) -> Schema {
        let mut def_name_to_index = HashMap::new();
        for (index, def) in defs.iter().enumerate() {
            def_name_to_index.insert(def.name.clone(), index);
        }
        Schema {
            defs,
            def_name_to_index,
        }
    }

    /// Look up a definition by name.
    pub fn def(&self, name: &str) -> Option<&Def> {
        self.def_name_to_index
            .get(name)
            .map(|index| &self.defs[*index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TYPE_STRING, TYPE_UINT32};

    fn person() -> Schema {
        Schema::new(vec![Def::new(
            "Person".to_owned(),
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
                    name: "age".to_owned(),
                    type_id: TYPE_UINT32,
                    repeated: false,
                    oneof_index: None,
                    number: 2,
                },
            ],
        )])
    }

    #[test]
    fn def_lookup_by_name() {
        let schema = person();
        let def = schema.def("Person").unwrap();
        assert_eq!(def.kind, DefKind::Message);
        assert_eq!(def.field("age").unwrap().type_id, TYPE_UINT32);
        assert_eq!(def.field("missing"), None);
        assert!(schema.def("Animal").is_none());
    }

    #[test]
    fn enum_value_lookup() {
        let def = Def::new(
            "PhoneType".to_owned(),
            DefKind::Enum,
            vec![
                Field {
                    name: "MOBILE".to_owned(),
                    type_id: 0,
                    repeated: false,
                    oneof_index: None,
                    number: 0,
                },
                Field {
                    name: "WORK".to_owned(),
                    type_id: 0,
                    repeated: false,
                    oneof_index: None,
                    number: 2,
                },
            ],
        );
        assert_eq!(def.field_value_to_index.get(&2), Some(&1));
        assert_eq!(def.field_value_to_index.get(&1), None);
    }
}
