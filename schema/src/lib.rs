//! Descriptor and value model for the prototext text-format codec.
//!
//! A [`Schema`](struct.Schema.html) is an immutable pool of message and enum
//! definitions. Parsed messages are represented as dynamic
//! [`Value`](enum.Value.html) trees that borrow type, field and constant
//! names from their schema: a value may outlive the text it was parsed from
//! but not the schema it conforms to.
//!
//! ```
//! use prototext_schema::*;
//!
//! let schema = Schema::new(vec![
//!     Def::new("Point".to_owned(), DefKind::Message, vec![
//!         Field {name: "x".to_owned(), type_id: TYPE_DOUBLE, repeated: false, oneof_index: None, number: 1},
//!         Field {name: "y".to_owned(), type_id: TYPE_DOUBLE, repeated: false, oneof_index: None, number: 2},
//!     ]),
//! ]);
//!
//! let mut point = Value::message_of(&schema, "Point").unwrap();
//! point.set("x", Value::Double(0.5));
//! point.set("y", Value::Double(-0.5));
//! assert_eq!(format!("{:?}", point), "Point {x: 0.5, y: -0.5}");
//! ```

pub mod descriptor;
pub mod value;

pub use descriptor::*;
pub use value::*;

pub const TYPE_BOOL: i32 = -1;
pub const TYPE_INT32: i32 = -2;
pub const TYPE_INT64: i32 = -3;
pub const TYPE_UINT32: i32 = -4;
pub const TYPE_UINT64: i32 = -5;
pub const TYPE_FLOAT: i32 = -6;
pub const TYPE_DOUBLE: i32 = -7;
pub const TYPE_STRING: i32 = -8;
pub const TYPE_BYTES: i32 = -9;

/// The textual name of a scalar `TYPE_*` constant, or `None` if `type_id`
/// does not name a scalar.
pub fn scalar_name(type_id: i32) -> Option<&'static str> {
    match type_id {
        TYPE_BOOL => Some("bool"),
        TYPE_INT32 => Some("int32"),
        TYPE_INT64 => Some("int64"),
        TYPE_UINT32 => Some("uint32"),
        TYPE_UINT64 => Some("uint64"),
        TYPE_FLOAT => Some("float"),
        TYPE_DOUBLE => Some("double"),
        TYPE_STRING => Some("string"),
        TYPE_BYTES => Some("bytes"),
        _ => None,
    }
}
