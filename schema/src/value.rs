use crate::descriptor::{DefKind, Schema};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

/// This type holds one dynamic prototext message value.
///
/// Values can represent anything a message descriptor can describe and are
/// the in-memory form the codec parses into and generates from. Enum, field
/// and message names are stored as string slices borrowed from their
/// [`Schema`](struct.Schema.html); a value can therefore outlive the text
/// buffer it was parsed from but can't outlive the schema.
#[derive(Clone, PartialEq)]
pub enum Value<'a> {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Ordered entries of a repeated field.
    Repeated(Vec<Value<'a>>),
    /// (enum type name, constant name).
    Enum(&'a str, &'a str),
    /// (message type name, populated fields).
    Message(&'a str, HashMap<&'a str, Value<'a>>),
}

impl<'a> Value<'a> {
    /// Create an empty message value for the definition named `name`,
    /// borrowing the type name from `schema`. Returns `None` if the schema
    /// has no message definition with that name.
    pub fn message_of(schema: &'a Schema, name: &str) -> Option<Value<'a>> {
        let def = schema.def(name)?;
        if def.kind != DefKind::Message {
            return None;
        }
        Some(Value::Message(def.name.as_str(), HashMap::new()))
    }

    /// A convenience method to extract the value out of a [Bool](#variant.Bool).
    /// Returns `false` for other value kinds.
    pub fn as_bool(&self) -> bool {
        match *self {
            Value::Bool(value) => value,
            _ => false,
        }
    }

    /// A convenience method to extract the value out of an [Int32](#variant.Int32).
    /// Returns `0` for other value kinds.
    pub fn as_i32(&self) -> i32 {
        match *self {
            Value::Int32(value) => value,
            _ => 0,
        }
    }

    /// A convenience method to extract the value out of an [Int64](#variant.Int64).
    /// Returns `0` for other value kinds.
    pub fn as_i64(&self) -> i64 {
        match *self {
            Value::Int64(value) => value,
            _ => 0,
        }
    }

    /// A convenience method to extract the value out of a [UInt32](#variant.UInt32).
    /// Returns `0` for other value kinds.
    pub fn as_u32(&self) -> u32 {
        match *self {
            Value::UInt32(value) => value,
            _ => 0,
        }
    }

    /// A convenience method to extract the value out of a [UInt64](#variant.UInt64).
    /// Returns `0` for other value kinds.
    pub fn as_u64(&self) -> u64 {
        match *self {
            Value::UInt64(value) => value,
            _ => 0,
        }
    }

    /// A convenience method to extract the value out of a [Float](#variant.Float).
    /// Returns `0.0` for other value kinds.
    pub fn as_f32(&self) -> f32 {
        match *self {
            Value::Float(value) => value,
            _ => 0.0,
        }
    }

    /// A convenience method to extract the value out of a [Double](#variant.Double).
    /// Returns `0.0` for other value kinds.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Double(value) => value,
            _ => 0.0,
        }
    }

    /// A convenience method to extract the text out of a [String](#variant.String)
    /// or the constant name out of an [Enum](#variant.Enum). Returns `""` for
    /// other value kinds.
    pub fn as_str(&self) -> &str {
        match *self {
            Value::String(ref value) => value.as_str(),
            Value::Enum(_, value) => value,
            _ => "",
        }
    }

    /// A convenience method to extract the payload out of a [Bytes](#variant.Bytes).
    /// Returns an empty slice for other value kinds.
    pub fn as_bytes(&self) -> &[u8] {
        match *self {
            Value::Bytes(ref value) => value.as_slice(),
            _ => &[],
        }
    }

    /// A convenience method to get the entries of a [Repeated](#variant.Repeated).
    /// Returns an empty slice for other value kinds.
    pub fn as_slice(&self) -> &[Value<'a>] {
        match *self {
            Value::Repeated(ref values) => values.as_slice(),
            _ => &[],
        }
    }

    /// A convenience method to extract the value out of an [Enum](#variant.Enum).
    /// Returns `("", "")` for other value kinds.
    pub fn as_enum(&self) -> (&str, &str) {
        match *self {
            Value::Enum(name, value) => (name, value),
            _ => ("", ""),
        }
    }

    /// A convenience method to extract the length out of a [Repeated](#variant.Repeated).
    /// Returns `0` for other value kinds.
    pub fn len(&self) -> usize {
        match *self {
            Value::Repeated(ref values) => values.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A convenience method to append to a [Repeated](#variant.Repeated). Does
    /// nothing for other value kinds.
    pub fn push(&mut self, value: Value<'a>) {
        if let Value::Repeated(ref mut values) = *self {
            values.push(value);
        }
    }

    /// A convenience method to extract a field out of a [Message](#variant.Message).
    /// Returns `None` for other value kinds or if the field isn't populated.
    pub fn get(&self, name: &str) -> Option<&Value<'a>> {
        match *self {
            Value::Message(_, ref fields) => fields.get(name),
            _ => None,
        }
    }

    /// A convenience method to update a field on a [Message](#variant.Message).
    /// Does nothing for other value kinds.
    pub fn set(&mut self, name: &'a str, value: Value<'a>) {
        if let Value::Message(_, ref mut fields) = *self {
            fields.insert(name, value);
        }
    }

    /// A convenience method to remove a field on a [Message](#variant.Message).
    /// Does nothing for other value kinds.
    pub fn remove(&mut self, name: &'a str) {
        if let Value::Message(_, ref mut fields) = *self {
            fields.remove(name);
        }
    }
}

impl<'a> Index<usize> for Value<'a> {
    type Output = Value<'a>;

    /// A convenience method that adds support for `self[index]` expressions.
    /// It will panic if this value isn't a [Repeated](#variant.Repeated) or if
    /// the provided index is out of bounds.
    fn index(&self, index: usize) -> &Value<'a> {
        match *self {
            Value::Repeated(ref values) => &values[index],
            _ => panic!("indexed a non-repeated value"),
        }
    }
}

impl<'a> fmt::Debug for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match *self {
            Value::Bool(value) => value.fmt(f),
            Value::Int32(value) => value.fmt(f),
            Value::Int64(value) => value.fmt(f),
            Value::UInt32(value) => value.fmt(f),
            Value::UInt64(value) => value.fmt(f),
            Value::Float(value) => value.fmt(f),
            Value::Double(value) => value.fmt(f),
            Value::String(ref value) => value.fmt(f),
            Value::Bytes(ref value) => value.fmt(f),
            Value::Repeated(ref values) => values.fmt(f),
            Value::Enum(name, ref value) => write!(f, "{}::{}", name, value),

            Value::Message(name, ref fields) => {
                let mut keys: Vec<_> = fields.keys().collect();
                let mut first = true;
                keys.sort();
                write!(f, "{} {{", name)?;

                for key in keys {
                    if first {
                        first = false;
                    } else {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {:?}", key, fields[key])?;
                }

                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Def, DefKind, Field, Schema};
    use crate::TYPE_UINT32;

    #[test]
    fn value_basic() {
        let value = Value::Repeated(vec![
            Value::Bool(true),
            Value::Int32(-1),
            Value::UInt32(1),
            Value::Float(0.5),
            Value::String("abc".to_owned()),
            Value::Bytes(vec![0, 255]),
            Value::Enum("Foo", "FOO"),
            Value::Message("Obj", {
                let mut map = HashMap::new();
                map.insert("key1", Value::String("value1".to_owned()));
                map.insert("key2", Value::String("value2".to_owned()));
                map
            }),
        ]);

        assert_eq!(value.len(), 8);

        assert_eq!(value[0], Value::Bool(true));
        assert_eq!(value[1], Value::Int32(-1));
        assert_eq!(value[2], Value::UInt32(1));
        assert_eq!(value[3], Value::Float(0.5));
        assert_eq!(value[4], Value::String("abc".to_owned()));
        assert_eq!(value[5], Value::Bytes(vec![0, 255]));
        assert_eq!(value[6], Value::Enum("Foo", "FOO"));

        assert_eq!(value[0].as_bool(), true);
        assert_eq!(value[1].as_i32(), -1);
        assert_eq!(value[2].as_u32(), 1);
        assert_eq!(value[3].as_f32(), 0.5);
        assert_eq!(value[4].as_str(), "abc");
        assert_eq!(value[5].as_bytes(), &[0, 255]);
        assert_eq!(value[6].as_enum(), ("Foo", "FOO"));
        assert_eq!(value.get("key1"), None);
        assert_eq!(
            value[7].get("key1"),
            Some(&Value::String("value1".to_owned()))
        );

        assert_eq!(
            format!("{:?}", value),
            "[true, -1, 1, 0.5, \"abc\", [0, 255], Foo::FOO, Obj {key1: \"value1\", key2: \"value2\"}]"
        );
    }

    #[test]
    fn value_push() {
        let mut value = Value::Repeated(vec![]);
        assert_eq!(value.len(), 0);

        value.push(Value::Int32(123));
        assert_eq!(value.len(), 1);
        assert_eq!(value[0], Value::Int32(123));

        value.push(Value::Int32(456));
        assert_eq!(value.len(), 2);
        assert_eq!(value[0], Value::Int32(123));
        assert_eq!(value[1], Value::Int32(456));
    }

    #[test]
    fn value_set_and_remove() {
        let mut value = Value::Message("Foo", HashMap::new());
        assert_eq!(value.get("x"), None);

        value.set("x", Value::Int32(123));
        assert_eq!(value.get("x"), Some(&Value::Int32(123)));

        value.set("y", Value::Int32(456));
        assert_eq!(value.get("x"), Some(&Value::Int32(123)));
        assert_eq!(value.get("y"), Some(&Value::Int32(456)));

        value.set("x", Value::Int32(789));
        assert_eq!(value.get("x"), Some(&Value::Int32(789)));

        value.remove("x");
        assert_eq!(value.get("x"), None);
        assert_eq!(value.get("y"), Some(&Value::Int32(456)));
    }

    #[test]
    fn message_of_checks_kind() {
        let schema = Schema::new(vec![
            Def::new(
                "Count".to_owned(),
                DefKind::Message,
                vec![Field {
                    name: "n".to_owned(),
                    type_id: TYPE_UINT32,
                    repeated: false,
                    oneof_index: None,
                    number: 1,
                }],
            ),
            Def::new("Kind".to_owned(), DefKind::Enum, vec![]),
        ]);

        assert!(Value::message_of(&schema, "Count").is_some());
        assert!(Value::message_of(&schema, "Kind").is_none());
        assert!(Value::message_of(&schema, "Nope").is_none());
    }
}
