//! Error types for lexing, parsing and object mapping.

use std::fmt;

use thiserror::Error;

use crate::token::TokenKind;

/// A location in the source text.
///
/// `offset` counts characters from the start of the input; `line` and
/// `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// The position of the first character of any input.
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 1,
    };
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// What went wrong while turning characters into tokens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexicalErrorKind {
    #[error("unknown character {0:?}")]
    UnknownCharacter(char),

    #[error("malformed keyword, expected `{expected}`")]
    MalformedKeyword { expected: &'static str },

    #[error("unterminated string literal")]
    UnterminatedString,

    /// Carries the partial lexeme read before the number went wrong.
    #[error("malformed number `{0}`")]
    MalformedNumber(String),
}

/// What the parser wanted at the position where it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// A specific token kind.
    Token(TokenKind),
    /// Any token that can start a value.
    Value,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{kind}"),
            Expected::Value => f.write_str("a value"),
        }
    }
}

/// Why a stored value could not be mapped onto a field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingErrorKind {
    /// The stored value has the wrong structure for the field kind
    /// (e.g. an object where an array was declared).
    #[error("expected {expected}, found {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("expected {expected} scalar, found {found}")]
    ScalarMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// One element of a scalar sequence or map does not match the declared
    /// element type.
    #[error("element {index}: expected {expected}, found {found}")]
    ElementMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing or non-string `__type` discriminator")]
    MissingDiscriminator,

    /// The discriminator names a type that is not registered as a variant
    /// of the field's abstract type.
    #[error("unknown variant `{0}`")]
    UnknownVariant(String),

    /// Encoding found a concrete value whose type was never registered as a
    /// variant of the field's abstract type.
    #[error("type `{0}` is not a registered variant of this field")]
    UnregisteredVariant(String),
}

/// Errors produced anywhere in the text → tree → object pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JsonError {
    #[error("lexical error at {position}: {kind}")]
    Lexical {
        kind: LexicalErrorKind,
        position: Position,
    },

    #[error("syntax error at {position}: expected {expected}, found {found}")]
    Syntax {
        expected: Expected,
        found: TokenKind,
        position: Position,
    },

    #[error("nesting deeper than {limit} levels at {position}")]
    DepthLimit { limit: usize, position: Position },

    /// `path` is the dotted field path from the decoded root, empty for
    /// the root itself.
    #[error("mapping error at `{}`: {kind}", display_path(.path))]
    Mapping {
        path: String,
        kind: MappingErrorKind,
    },

    #[error("type `{type_name}` is not registered as mappable")]
    NotMappable { type_name: String },

    #[error("registration error: {0}")]
    Registration(String),
}

impl JsonError {
    pub(crate) fn mapping(kind: MappingErrorKind) -> Self {
        JsonError::Mapping {
            path: String::new(),
            kind,
        }
    }

    /// Prefix the path of a mapping error with the field (or `[index]`)
    /// it propagated out of. Other errors pass through untouched.
    pub(crate) fn within(self, segment: &str) -> Self {
        match self {
            JsonError::Mapping { path, kind } => {
                let path = if path.is_empty() {
                    segment.to_string()
                } else if path.starts_with('[') {
                    format!("{segment}{path}")
                } else {
                    format!("{segment}.{path}")
                };
                JsonError::Mapping { path, kind }
            }
            other => other,
        }
    }

    /// Source position for lexical, syntax and depth errors.
    pub fn position(&self) -> Option<Position> {
        match self {
            JsonError::Lexical { position, .. }
            | JsonError::Syntax { position, .. }
            | JsonError::DepthLimit { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, JsonError::Mapping { .. })
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

/// Convenience alias used throughout jsonmap-core.
pub type Result<T> = std::result::Result<T, JsonError>;
