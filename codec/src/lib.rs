//! prototext-codec
//!
//! This crate implements:
//!  1) A scanner for the prototext message syntax,
//!  2) A descriptor-driven parser that builds `Value` trees,
//!  3) A generator that serializes a `Value` back to canonical text,
//!  4) A schema verifier and a JSON schema loader,
//!  5) Error types (`TextError`).

pub mod error;
pub mod generator;
pub mod loader;
pub mod parser;
pub mod tokenizer;
pub mod utils;
pub mod verifier;

pub use error::{Location, TextError};
pub use generator::generate_to_string;
pub use loader::schema_from_json;
pub use parser::{
    parse_from_string, DuplicatePolicy, ParseOptions, Parser, UnknownFieldPolicy,
};
pub use tokenizer::{Scanner, Token, TokenKind};
pub use verifier::verify_schema;
