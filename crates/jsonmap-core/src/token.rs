//! Lexical tokens produced by the [`Tokenizer`](crate::lexer::Tokenizer).

use std::fmt;

use crate::error::Position;

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    BraceOpen,
    BraceClose,
    BracketOpen,
    BracketClose,
    Comma,
    Colon,
    String,
    Int,
    Float,
    True,
    False,
    Null,
}

impl TokenKind {
    /// Map a punctuation character to its token kind.
    pub fn punctuation(ch: char) -> Option<TokenKind> {
        match ch {
            '{' => Some(TokenKind::BraceOpen),
            '}' => Some(TokenKind::BraceClose),
            '[' => Some(TokenKind::BracketOpen),
            ']' => Some(TokenKind::BracketClose),
            ',' => Some(TokenKind::Comma),
            ':' => Some(TokenKind::Colon),
            _ => None,
        }
    }

    /// Whether a token of this kind can begin a value.
    pub fn starts_value(self) -> bool {
        matches!(
            self,
            TokenKind::BraceOpen
                | TokenKind::BracketOpen
                | TokenKind::String
                | TokenKind::Int
                | TokenKind::Float
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Eof => "end of input",
            TokenKind::BraceOpen => "`{`",
            TokenKind::BraceClose => "`}`",
            TokenKind::BracketOpen => "`[`",
            TokenKind::BracketClose => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::String => "string",
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Null => "`null`",
        };
        f.write_str(text)
    }
}

/// A classified lexical unit.
///
/// `text` holds the raw lexeme for strings (between the quotes, escapes
/// untouched) and numbers; it is empty for punctuation, keywords and EOF.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Where the token starts in the source.
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Self {
            kind,
            text: String::new(),
            position,
        }
    }

    pub fn with_text(kind: TokenKind, text: String, position: Position) -> Self {
        Self {
            kind,
            text,
            position,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} {:?}", self.kind, self.text)
        }
    }
}
