//! Character cursor with one-character lookahead.

use std::str::Chars;

use crate::error::Position;

/// Walks the input one `char` at a time. `None` is the end-of-input
/// sentinel and is returned forever once the input is exhausted.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    chars: Chars<'a>,
    current: Option<char>,
    position: Position,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars();
        let current = chars.next();
        Self {
            chars,
            current,
            position: Position::START,
        }
    }

    /// The current character, without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.current
    }

    /// Return the current character and move past it.
    #[inline]
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.current;
        self.bump();
        ch
    }

    /// Move past the current character.
    pub fn bump(&mut self) {
        let Some(ch) = self.current else {
            return;
        };
        self.position.offset += 1;
        if ch == '\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
        self.current = self.chars.next();
    }

    /// Position of the current character (or of EOF).
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.current.is_none()
    }
}
