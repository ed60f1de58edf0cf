use crate::error::{Location, TextError};
use crate::utils::quote;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Integer or floating literal: optional sign, digits, optional
    /// fraction and exponent. A token run that fails this check is a
    /// lexical error, never a value handed to the parser.
    pub static ref NUMBER_RX: Regex =
        Regex::new(r"^[-+]?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?$").unwrap();
}

/// A classified lexical unit.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Unquoted identifier run: field names, enum constants, `true`/`false`.
    Bareword(String),
    /// Quoted run with escapes already decoded. Carried as bytes because
    /// escapes may encode non-UTF-8 payloads destined for `bytes` fields.
    Quoted(Vec<u8>),
    /// Lexically validated numeric literal, kept as written; the parser
    /// coerces it against the field's declared type.
    Number(String),
    OpenBrace,
    CloseBrace,
    Colon,
    Eof,
}

impl TokenKind {
    /// Short description used in "expected X but found Y" diagnostics.
    pub fn describe(&self) -> String {
        match *self {
            TokenKind::Bareword(ref word) => quote(word),
            TokenKind::Quoted(_) => "a quoted string".to_owned(),
            TokenKind::Number(ref text) => quote(text),
            TokenKind::OpenBrace => "\"{\"".to_owned(),
            TokenKind::CloseBrace => "\"}\"".to_owned(),
            TokenKind::Colon => "\":\"".to_owned(),
            TokenKind::Eof => "end of input".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub at: Location,
}

/// A lazy tokenizer over one input buffer.
///
/// One scanner serves exactly one parse: [`next_token`](Scanner::next_token)
/// always advances, there is no way to rewind, and once end of input is
/// reached every further call keeps returning [`TokenKind::Eof`]. Errors
/// carry the location of the offending byte and end scanning for the parse.
pub struct Scanner<'s> {
    input: &'s [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'s> Scanner<'s> {
    pub fn new(text: &'s str) -> Scanner<'s> {
        Scanner {
            input: text.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// The location of the next unread byte.
    pub fn location(&self) -> Location {
        Location {
            offset: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if byte & 0xC0 != 0x80 {
            // UTF-8 continuation bytes don't advance the column.
            self.column += 1;
        }
        Some(byte)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace() {
                self.bump();
            } else if byte == b'#' {
                while let Some(byte) = self.bump() {
                    if byte == b'\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Result<Token, TextError> {
        self.skip_whitespace_and_comments();
        let at = self.location();

        let byte = match self.peek() {
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    at,
                })
            }
            Some(byte) => byte,
        };

        let kind = match byte {
            b'{' => {
                self.bump();
                TokenKind::OpenBrace
            }
            b'}' => {
                self.bump();
                TokenKind::CloseBrace
            }
            b':' => {
                self.bump();
                TokenKind::Colon
            }
            b'"' | b'\'' => {
                self.bump();
                self.scan_quoted(byte, at)?
            }
            b'0'..=b'9' | b'-' | b'+' | b'.' => self.scan_number(at)?,
            _ if byte == b'_' || byte.is_ascii_alphabetic() => self.scan_bareword(),
            _ => {
                return Err(TextError::Lexical {
                    msg: format!("unexpected character {}", quote(&(byte as char).to_string())),
                    at,
                })
            }
        };

        Ok(Token { kind, at })
    }

    fn scan_bareword(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte == b'_' || byte.is_ascii_alphanumeric() {
                self.bump();
            } else {
                break;
            }
        }
        // Bareword bytes are all ASCII.
        let word = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        TokenKind::Bareword(word)
    }

    /// Numeric runs are consumed maximally so that `12x4` is rejected here
    /// as one malformed literal instead of reaching the parser as `12`
    /// followed by a stray bareword.
    fn scan_number(&mut self, at: Location) -> Result<TokenKind, TextError> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            match byte {
                b'0'..=b'9' | b'.' | b'+' | b'-' | b'_' => {
                    self.bump();
                }
                _ if byte.is_ascii_alphabetic() => {
                    self.bump();
                }
                _ => break,
            }
        }
        let text = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        if !NUMBER_RX.is_match(&text) {
            return Err(TextError::Lexical {
                msg: format!("malformed numeric literal {}", quote(&text)),
                at,
            });
        }
        Ok(TokenKind::Number(text))
    }

    fn scan_quoted(&mut self, delimiter: u8, at: Location) -> Result<TokenKind, TextError> {
        let mut payload = Vec::new();
        loop {
            let byte = match self.bump() {
                None => {
                    return Err(TextError::Lexical {
                        msg: "unterminated string literal".to_owned(),
                        at,
                    })
                }
                Some(byte) => byte,
            };
            match byte {
                _ if byte == delimiter => return Ok(TokenKind::Quoted(payload)),
                b'\n' => {
                    return Err(TextError::Lexical {
                        msg: "newline inside string literal".to_owned(),
                        at,
                    })
                }
                b'\\' => payload.push(self.scan_escape(at)?),
                _ => payload.push(byte),
            }
        }
    }

    fn scan_escape(&mut self, at: Location) -> Result<u8, TextError> {
        let escape_at = self.location();
        let byte = match self.bump() {
            None => {
                return Err(TextError::Lexical {
                    msg: "unterminated string literal".to_owned(),
                    at,
                })
            }
            Some(byte) => byte,
        };
        match byte {
            b'n' => Ok(b'\n'),
            b'r' => Ok(b'\r'),
            b't' => Ok(b'\t'),
            b'a' => Ok(0x07),
            b'b' => Ok(0x08),
            b'f' => Ok(0x0C),
            b'v' => Ok(0x0B),
            b'\\' => Ok(b'\\'),
            b'\'' => Ok(b'\''),
            b'"' => Ok(b'"'),
            b'?' => Ok(b'?'),
            b'0'..=b'7' => {
                // Up to three octal digits, first one already read.
                let mut value = (byte - b'0') as u32;
                for _ in 0..2 {
                    match self.peek() {
                        Some(digit @ b'0'..=b'7') => {
                            self.bump();
                            value = value * 8 + (digit - b'0') as u32;
                        }
                        _ => break,
                    }
                }
                if value > 0xFF {
                    return Err(TextError::Lexical {
                        msg: format!("octal escape \\{:o} is out of range", value),
                        at: escape_at,
                    });
                }
                Ok(value as u8)
            }
            b'x' => {
                // One or two hex digits; capped at two so generated \xHH
                // escapes re-scan unambiguously.
                let mut value: u32 = 0;
                let mut digits = 0;
                while digits < 2 {
                    match self.peek() {
                        Some(digit) if digit.is_ascii_hexdigit() => {
                            self.bump();
                            value = value * 16 + (digit as char).to_digit(16).unwrap_or(0);
                            digits += 1;
                        }
                        _ => break,
                    }
                }
                if digits == 0 {
                    return Err(TextError::Lexical {
                        msg: "hex escape with no digits".to_owned(),
                        at: escape_at,
                    });
                }
                Ok(value as u8)
            }
            _ => Err(TextError::Lexical {
                msg: format!("invalid escape sequence \\{}", byte as char),
                at: escape_at,
            }),
        }
    }
}
