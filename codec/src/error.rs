use std::fmt;
use thiserror::Error;

/// A position in the input text: byte offset plus 1-based line and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (offset {})",
            self.line, self.column, self.offset
        )
    }
}

/// The single error type of the codec.
///
/// Every parse-side variant carries the [`Location`] of the offending
/// input. All errors are terminal for the call that produced them; the
/// codec never recovers locally or returns partial output.
#[derive(Debug, Error)]
pub enum TextError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Syntax error at {at}: {msg}")]
    Lexical { msg: String, at: Location },

    #[error("Unknown field {name:?} at {at}")]
    UnknownField { name: String, at: Location },

    #[error("Type mismatch at {at}: {msg}")]
    TypeMismatch { msg: String, at: Location },

    #[error("Numeric value out of range at {at}: {msg}")]
    NumericRange { msg: String, at: Location },

    #[error("Unknown literal at {at}: {msg}")]
    UnknownLiteral { msg: String, at: Location },

    #[error("Unexpected token at {at}: {msg}")]
    UnexpectedToken { msg: String, at: Location },

    #[error("Structural error at {at}: {msg}")]
    Structural { msg: String, at: Location },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Generate error: {0}")]
    Generate(String),
}

impl TextError {
    /// The input location this error points at, when it has one.
    pub fn location(&self) -> Option<Location> {
        match *self {
            TextError::Lexical { at, .. }
            | TextError::UnknownField { at, .. }
            | TextError::TypeMismatch { at, .. }
            | TextError::NumericRange { at, .. }
            | TextError::UnknownLiteral { at, .. }
            | TextError::UnexpectedToken { at, .. }
            | TextError::Structural { at, .. } => Some(at),
            TextError::Io(_) | TextError::Schema(_) | TextError::Generate(_) => None,
        }
    }
}
