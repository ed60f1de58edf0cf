use crate::error::{Location, TextError};
use crate::tokenizer::{Scanner, Token, TokenKind};
use crate::utils::quote;
use prototext_schema::{
    scalar_name, Def, DefKind, Field, Schema, Value, TYPE_BOOL, TYPE_BYTES, TYPE_DOUBLE,
    TYPE_FLOAT, TYPE_INT32, TYPE_INT64, TYPE_STRING, TYPE_UINT32, TYPE_UINT64,
};
use std::collections::HashMap;
use tracing::debug;

/// How the parser treats a field name the descriptor doesn't know.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    #[default]
    Error,
    /// Consume and discard the field's value (scalar token or balanced
    /// brace block) and keep going.
    Skip,
}

/// How the parser treats a second occurrence of a non-repeated field, or
/// a second populated member of a oneof group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Last one wins.
    #[default]
    Overwrite,
    Error,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ParseOptions {
    pub on_unknown_field: UnknownFieldPolicy,
    pub duplicate_oneof: DuplicatePolicy,
    pub duplicate_scalar: DuplicatePolicy,
}

/// Descriptor-driven recursive-descent parser over one [`Scanner`].
///
/// The string and file entry points wrap this type; it is public so a
/// message embedded in a larger stream can be parsed with custom framing:
/// hand the parser a scanner, call [`parse`](Parser::parse) or
/// [`parse_delimited`](Parser::parse_delimited), then read
/// [`position`](Parser::position) to learn where the message ended.
pub struct Parser<'a, 's> {
    schema: &'a Schema,
    scanner: Scanner<'s>,
    options: ParseOptions,
}

/// Parse `text` as one `message` body running to end of input.
pub fn parse_from_string<'a>(
    schema: &'a Schema,
    message: &str,
    text: &str,
    options: &ParseOptions,
) -> Result<Value<'a>, TextError> {
    Parser::new(schema, Scanner::new(text), *options).parse(message)
}

impl<'a, 's> Parser<'a, 's> {
    pub fn new(schema: &'a Schema, scanner: Scanner<'s>, options: ParseOptions) -> Parser<'a, 's> {
        Parser {
            schema,
            scanner,
            options,
        }
    }

    /// The location the scanner will read the next token from.
    pub fn position(&self) -> Location {
        self.scanner.location()
    }

    /// Parse fields of `message` until end of input.
    pub fn parse(&mut self, message: &str) -> Result<Value<'a>, TextError> {
        let def = self.message_def(message)?;
        debug!(root = message, "parsing text message");
        self.parse_body(def, None)
    }

    /// Parse one brace-delimited `message` (`{ ... }`), leaving the scanner
    /// positioned just past the closing brace.
    pub fn parse_delimited(&mut self, message: &str) -> Result<Value<'a>, TextError> {
        let def = self.message_def(message)?;
        let token = self.next()?;
        if token.kind != TokenKind::OpenBrace {
            return Err(TextError::UnexpectedToken {
                msg: format!("expected \"{{\" but found {}", token.kind.describe()),
                at: token.at,
            });
        }
        self.parse_body(def, Some(token.at))
    }

    fn message_def(&self, name: &str) -> Result<&'a Def, TextError> {
        let def = self
            .schema
            .def(name)
            .ok_or_else(|| TextError::Schema(format!("no definition named {}", quote(name))))?;
        if def.kind != DefKind::Message {
            return Err(TextError::Schema(format!(
                "{} is an enum, not a message",
                quote(name)
            )));
        }
        Ok(def)
    }

    fn next(&mut self) -> Result<Token, TextError> {
        self.scanner.next_token()
    }

    /// One message body: fields until the matching close brace (nested
    /// call, `opened` holds the brace's location) or end of input (top
    /// level, `opened` is `None`).
    fn parse_body(
        &mut self,
        def: &'a Def,
        opened: Option<Location>,
    ) -> Result<Value<'a>, TextError> {
        let mut fields: HashMap<&'a str, Value<'a>> = HashMap::new();

        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Eof => {
                    return match opened {
                        None => Ok(Value::Message(def.name.as_str(), fields)),
                        Some(at) => Err(TextError::Structural {
                            msg: format!(
                                "message {} opened here was never closed",
                                quote(&def.name)
                            ),
                            at,
                        }),
                    };
                }
                TokenKind::CloseBrace => {
                    if opened.is_some() {
                        return Ok(Value::Message(def.name.as_str(), fields));
                    }
                    return Err(TextError::Structural {
                        msg: "unmatched \"}\"".to_owned(),
                        at: token.at,
                    });
                }
                TokenKind::Bareword(name) => {
                    self.parse_field(def, &mut fields, &name, token.at)?;
                }
                other => {
                    return Err(TextError::UnexpectedToken {
                        msg: format!("expected a field name but found {}", other.describe()),
                        at: token.at,
                    });
                }
            }
        }
    }

    fn parse_field(
        &mut self,
        def: &'a Def,
        fields: &mut HashMap<&'a str, Value<'a>>,
        name: &str,
        at: Location,
    ) -> Result<(), TextError> {
        let index = match def.field_name_to_index.get(name) {
            Some(&index) => index,
            None => {
                return match self.options.on_unknown_field {
                    UnknownFieldPolicy::Error => Err(TextError::UnknownField {
                        name: name.to_owned(),
                        at,
                    }),
                    UnknownFieldPolicy::Skip => {
                        debug!(field = name, "skipping unknown field");
                        self.skip_field_value()
                    }
                };
            }
        };
        let field = &def.fields[index];

        let value = if let Some(nested) = self.message_type(field) {
            // Nested message: optional ':' then a brace-delimited body.
            let mut token = self.next()?;
            if token.kind == TokenKind::Colon {
                token = self.next()?;
            }
            if token.kind != TokenKind::OpenBrace {
                return Err(TextError::UnexpectedToken {
                    msg: format!(
                        "expected \"{{\" for field {} but found {}",
                        quote(&field.name),
                        token.kind.describe()
                    ),
                    at: token.at,
                });
            }
            self.parse_body(nested, Some(token.at))?
        } else {
            let token = self.next()?;
            if token.kind != TokenKind::Colon {
                return Err(TextError::UnexpectedToken {
                    msg: format!(
                        "expected \":\" after field {} but found {}",
                        quote(&field.name),
                        token.kind.describe()
                    ),
                    at: token.at,
                });
            }
            let token = self.next()?;
            self.coerce(field, token)?
        };

        self.store(def, fields, field, value, at)
    }

    /// The message def a field refers to, or `None` for scalars and enums.
    fn message_type(&self, field: &Field) -> Option<&'a Def> {
        if field.type_id < 0 {
            return None;
        }
        let def = &self.schema.defs[field.type_id as usize];
        if def.kind == DefKind::Message {
            Some(def)
        } else {
            None
        }
    }

    fn enum_type(&self, field: &Field) -> Option<&'a Def> {
        if field.type_id < 0 {
            return None;
        }
        let def = &self.schema.defs[field.type_id as usize];
        if def.kind == DefKind::Enum {
            Some(def)
        } else {
            None
        }
    }

    fn store(
        &self,
        def: &'a Def,
        fields: &mut HashMap<&'a str, Value<'a>>,
        field: &'a Field,
        value: Value<'a>,
        at: Location,
    ) -> Result<(), TextError> {
        let name = field.name.as_str();

        if field.repeated {
            fields
                .entry(name)
                .or_insert_with(|| Value::Repeated(Vec::new()))
                .push(value);
            return Ok(());
        }

        if let Some(group) = field.oneof_index {
            let sibling = def
                .fields
                .iter()
                .find(|other| {
                    other.oneof_index == Some(group)
                        && other.name != field.name
                        && fields.contains_key(other.name.as_str())
                })
                .map(|other| other.name.as_str());
            if let Some(other) = sibling {
                match self.options.duplicate_oneof {
                    DuplicatePolicy::Error => {
                        return Err(TextError::Structural {
                            msg: format!(
                                "oneof {} already holds {} when {} is set",
                                quote(&def.oneofs[group]),
                                quote(other),
                                quote(name)
                            ),
                            at,
                        });
                    }
                    DuplicatePolicy::Overwrite => {
                        fields.remove(other);
                    }
                }
            }
        }

        if fields.contains_key(name) && self.options.duplicate_scalar == DuplicatePolicy::Error {
            return Err(TextError::Structural {
                msg: format!("field {} is set more than once", quote(name)),
                at,
            });
        }
        fields.insert(name, value);
        Ok(())
    }

    fn coerce(&self, field: &'a Field, token: Token) -> Result<Value<'a>, TextError> {
        match token.kind {
            TokenKind::Number(text) => self.coerce_number(field, &text, token.at),
            TokenKind::Quoted(payload) => self.coerce_quoted(field, payload, token.at),
            TokenKind::Bareword(word) => self.coerce_bareword(field, &word, token.at),
            other => Err(TextError::UnexpectedToken {
                msg: format!(
                    "expected a value for field {} but found {}",
                    quote(&field.name),
                    other.describe()
                ),
                at: token.at,
            }),
        }
    }

    fn coerce_quoted(
        &self,
        field: &'a Field,
        payload: Vec<u8>,
        at: Location,
    ) -> Result<Value<'a>, TextError> {
        match field.type_id {
            TYPE_STRING => match String::from_utf8(payload) {
                Ok(text) => Ok(Value::String(text)),
                Err(_) => Err(TextError::TypeMismatch {
                    msg: format!("field {} expects UTF-8 text", quote(&field.name)),
                    at,
                }),
            },
            TYPE_BYTES => Ok(Value::Bytes(payload)),
            _ => Err(TextError::TypeMismatch {
                msg: format!(
                    "quoted value for {} field {}",
                    self.declared_type(field),
                    quote(&field.name)
                ),
                at,
            }),
        }
    }

    fn coerce_bareword(
        &self,
        field: &'a Field,
        word: &str,
        at: Location,
    ) -> Result<Value<'a>, TextError> {
        if field.type_id == TYPE_BOOL {
            return match word {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(TextError::UnknownLiteral {
                    msg: format!(
                        "{} is not a boolean literal for field {}",
                        quote(word),
                        quote(&field.name)
                    ),
                    at,
                }),
            };
        }
        if let Some(def) = self.enum_type(field) {
            return match def.field_name_to_index.get(word) {
                Some(&index) => Ok(Value::Enum(
                    def.name.as_str(),
                    def.fields[index].name.as_str(),
                )),
                None => Err(TextError::UnknownLiteral {
                    msg: format!("enum {} has no constant {}", quote(&def.name), quote(word)),
                    at,
                }),
            };
        }
        Err(TextError::TypeMismatch {
            msg: format!(
                "bareword {} for {} field {}",
                quote(word),
                self.declared_type(field),
                quote(&field.name)
            ),
            at,
        })
    }

    fn coerce_number(
        &self,
        field: &'a Field,
        text: &str,
        at: Location,
    ) -> Result<Value<'a>, TextError> {
        match field.type_id {
            TYPE_FLOAT => {
                let value = self.parse_float(field, text, at)?;
                let narrowed = value as f32;
                if !narrowed.is_finite() {
                    return Err(TextError::NumericRange {
                        msg: format!(
                            "{} exceeds the range of float field {}",
                            quote(text),
                            quote(&field.name)
                        ),
                        at,
                    });
                }
                Ok(Value::Float(narrowed))
            }
            TYPE_DOUBLE => Ok(Value::Double(self.parse_float(field, text, at)?)),
            TYPE_INT32 => Ok(Value::Int32(
                self.parse_integer(field, text, at, i32::MIN as i128, i32::MAX as i128)? as i32,
            )),
            TYPE_INT64 => Ok(Value::Int64(
                self.parse_integer(field, text, at, i64::MIN as i128, i64::MAX as i128)? as i64,
            )),
            TYPE_UINT32 => Ok(Value::UInt32(
                self.parse_integer(field, text, at, 0, u32::MAX as i128)? as u32,
            )),
            TYPE_UINT64 => Ok(Value::UInt64(
                self.parse_integer(field, text, at, 0, u64::MAX as i128)? as u64,
            )),
            _ => {
                if let Some(def) = self.enum_type(field) {
                    let number =
                        self.parse_integer(field, text, at, i32::MIN as i128, i32::MAX as i128)?
                            as i32;
                    return match def.field_value_to_index.get(&number) {
                        Some(&index) => Ok(Value::Enum(
                            def.name.as_str(),
                            def.fields[index].name.as_str(),
                        )),
                        None => Err(TextError::UnknownLiteral {
                            msg: format!(
                                "enum {} has no constant with number {}",
                                quote(&def.name),
                                number
                            ),
                            at,
                        }),
                    };
                }
                Err(TextError::TypeMismatch {
                    msg: format!(
                        "numeric value for {} field {}",
                        self.declared_type(field),
                        quote(&field.name)
                    ),
                    at,
                })
            }
        }
    }

    fn parse_float(&self, field: &Field, text: &str, at: Location) -> Result<f64, TextError> {
        let value: f64 = text.parse().map_err(|_| TextError::NumericRange {
            msg: format!("{} does not fit field {}", quote(text), quote(&field.name)),
            at,
        })?;
        if !value.is_finite() {
            return Err(TextError::NumericRange {
                msg: format!(
                    "{} exceeds the range of field {}",
                    quote(text),
                    quote(&field.name)
                ),
                at,
            });
        }
        Ok(value)
    }

    fn parse_integer(
        &self,
        field: &Field,
        text: &str,
        at: Location,
        min: i128,
        max: i128,
    ) -> Result<i128, TextError> {
        if text.contains(['.', 'e', 'E']) {
            return Err(TextError::TypeMismatch {
                msg: format!(
                    "floating-point literal for integer field {}",
                    quote(&field.name)
                ),
                at,
            });
        }
        let value: i128 = text.parse().map_err(|_| TextError::NumericRange {
            msg: format!("{} is not a representable integer", quote(text)),
            at,
        })?;
        if value < min || value > max {
            return Err(TextError::NumericRange {
                msg: format!(
                    "{} is out of range for {} field {}",
                    text,
                    self.declared_type(field),
                    quote(&field.name)
                ),
                at,
            });
        }
        Ok(value)
    }

    fn declared_type(&self, field: &Field) -> String {
        if let Some(name) = scalar_name(field.type_id) {
            return name.to_owned();
        }
        match self.schema.defs.get(field.type_id as usize) {
            Some(def) => def.name.clone(),
            None => format!("type #{}", field.type_id),
        }
    }

    /// Consume an unknown field's value without recording anything:
    /// an optional ':' followed by one scalar token, or a balanced brace
    /// block (with or without the ':').
    fn skip_field_value(&mut self) -> Result<(), TextError> {
        let mut token = self.next()?;
        if token.kind == TokenKind::Colon {
            token = self.next()?;
        }
        match token.kind {
            TokenKind::Number(_) | TokenKind::Quoted(_) | TokenKind::Bareword(_) => Ok(()),
            TokenKind::OpenBrace => self.skip_balanced(token.at),
            other => Err(TextError::UnexpectedToken {
                msg: format!("expected a value but found {}", other.describe()),
                at: token.at,
            }),
        }
    }

    fn skip_balanced(&mut self, opened: Location) -> Result<(), TextError> {
        let mut depth = 1usize;
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::OpenBrace => depth += 1,
                TokenKind::CloseBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                TokenKind::Eof => {
                    return Err(TextError::Structural {
                        msg: "message opened here was never closed".to_owned(),
                        at: opened,
                    });
                }
                _ => {}
            }
        }
    }
}
