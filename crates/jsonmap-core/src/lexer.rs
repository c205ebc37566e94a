//! Tokenizer: turns a [`Cursor`] into a stream of [`Token`]s.
//!
//! The tokenizer always holds exactly one token of lookahead: the first token
//! is lexed during construction, and [`Tokenizer::take`] lexes the next
//! one before handing back the current one. Lexing steps, in priority order:
//!
//! 1. end of input → `Eof`
//! 2. skip whitespace (re-checking for end of input)
//! 3. `t`/`f`/`n` → the keyword it starts, which must match exactly
//! 4. `{ } [ ] , :` → punctuation
//! 5. `"` → string, raw text kept as written
//! 6. `-` or digit → number, classified `Int` or `Float`
//! 7. anything else → unknown character
//!
//! String tokens carry their raw source text between the quotes;
//! [`decode_string`] resolves the escapes `\\ \n \r \t \" \f \b`. Any other
//! backslash pair is kept literally, so `\uXXXX` is not decoded.

use std::mem;

use crate::cursor::Cursor;
use crate::error::{JsonError, LexicalErrorKind, Position, Result};
use crate::token::{Token, TokenKind};

const KEYWORDS: [(&str, TokenKind); 3] = [
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("null", TokenKind::Null),
];

/// Map the character after a backslash to the character it stands for.
fn unescape(ch: char) -> Option<char> {
    match ch {
        '\\' => Some('\\'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '"' => Some('"'),
        'f' => Some('\u{0C}'),
        'b' => Some('\u{08}'),
        _ => None,
    }
}

/// Single-use tokenizer over one input string.
#[derive(Debug)]
pub struct Tokenizer<'a> {
    cursor: Cursor<'a>,
    current: Token,
}

impl<'a> Tokenizer<'a> {
    /// Build a tokenizer and lex its first token.
    pub fn new(input: &'a str) -> Result<Self> {
        let mut cursor = Cursor::new(input);
        let current = lex(&mut cursor)?;
        Ok(Self { cursor, current })
    }

    /// The current token, without consuming it.
    #[inline]
    pub fn peek(&self) -> &Token {
        &self.current
    }

    /// Return the current token and lex the next one.
    pub fn take(&mut self) -> Result<Token> {
        let next = lex(&mut self.cursor)?;
        Ok(mem::replace(&mut self.current, next))
    }

    /// Position just past the last character the tokenizer has read.
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// Consume the tokenizer as an iterator over the remaining tokens.
    pub fn into_tokens(self) -> Tokens<'a> {
        Tokens { inner: self }
    }
}

/// Iterator returned by [`Tokenizer::into_tokens`].
///
/// Yields every token up to, but not including, `Eof`. A lexical error is
/// yielded once and ends the iteration.
#[derive(Debug)]
pub struct Tokens<'a> {
    inner: Tokenizer<'a>,
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        let tokenizer = &mut self.inner;
        if tokenizer.current.kind == TokenKind::Eof {
            return None;
        }
        match tokenizer.take() {
            Ok(token) => Some(Ok(token)),
            Err(err) => {
                tokenizer.current = Token::new(TokenKind::Eof, tokenizer.cursor.position());
                Some(Err(err))
            }
        }
    }
}

/// Resolve the escapes in the raw text of a string token.
pub fn decode_string(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            text.push(ch);
            continue;
        }
        match chars.next() {
            Some(escaped) => match unescape(escaped) {
                Some(ch) => text.push(ch),
                None => {
                    text.push('\\');
                    text.push(escaped);
                }
            },
            None => text.push('\\'),
        }
    }
    text
}

fn lex(cursor: &mut Cursor<'_>) -> Result<Token> {
    skip_whitespace(cursor);
    let start = cursor.position();

    let Some(ch) = cursor.peek() else {
        return Ok(Token::new(TokenKind::Eof, start));
    };

    if let Some((word, kind)) = KEYWORDS.iter().find(|(word, _)| word.starts_with(ch)) {
        return lex_keyword(cursor, *word, *kind);
    }

    if let Some(kind) = TokenKind::punctuation(ch) {
        cursor.bump();
        return Ok(Token::new(kind, start));
    }

    if ch == '"' {
        return lex_string(cursor);
    }

    if ch == '-' || ch.is_ascii_digit() {
        return lex_number(cursor);
    }

    Err(lexical(LexicalErrorKind::UnknownCharacter(ch), start))
}

fn skip_whitespace(cursor: &mut Cursor<'_>) {
    while cursor.peek().is_some_and(char::is_whitespace) {
        cursor.bump();
    }
}

fn lex_keyword(cursor: &mut Cursor<'_>, word: &'static str, kind: TokenKind) -> Result<Token> {
    let start = cursor.position();
    for expected in word.chars() {
        let at = cursor.position();
        if cursor.advance() != Some(expected) {
            return Err(lexical(
                LexicalErrorKind::MalformedKeyword { expected: word },
                at,
            ));
        }
    }
    Ok(Token::new(kind, start))
}

fn lex_string(cursor: &mut Cursor<'_>) -> Result<Token> {
    let start = cursor.position();
    cursor.bump(); // opening quote
    let mut raw = String::new();

    loop {
        match cursor.advance() {
            None => return Err(lexical(LexicalErrorKind::UnterminatedString, start)),
            Some('"') => break,
            Some('\\') => match cursor.advance() {
                None => return Err(lexical(LexicalErrorKind::UnterminatedString, start)),
                Some(escaped) => {
                    raw.push('\\');
                    raw.push(escaped);
                }
            },
            Some(ch) => raw.push(ch),
        }
    }

    Ok(Token::with_text(TokenKind::String, raw, start))
}

fn lex_number(cursor: &mut Cursor<'_>) -> Result<Token> {
    let start = cursor.position();
    let mut lexeme = String::new();
    let mut is_float = false;

    if cursor.peek() == Some('-') {
        lexeme.push('-');
        cursor.bump();
    }
    take_digits(cursor, &mut lexeme, start)?;

    if cursor.peek() == Some('.') {
        is_float = true;
        lexeme.push('.');
        cursor.bump();
        take_digits(cursor, &mut lexeme, start)?;
    }

    if let Some(e @ ('e' | 'E')) = cursor.peek() {
        is_float = true;
        lexeme.push(e);
        cursor.bump();
        if let Some(sign @ ('+' | '-')) = cursor.peek() {
            lexeme.push(sign);
            cursor.bump();
        }
        take_digits(cursor, &mut lexeme, start)?;
    }

    let kind = if is_float {
        TokenKind::Float
    } else {
        TokenKind::Int
    };
    Ok(Token::with_text(kind, lexeme, start))
}

/// Consume a non-empty run of ASCII digits into `lexeme`.
fn take_digits(cursor: &mut Cursor<'_>, lexeme: &mut String, start: Position) -> Result<()> {
    let before = lexeme.len();
    while let Some(digit) = cursor.peek().filter(char::is_ascii_digit) {
        lexeme.push(digit);
        cursor.bump();
    }
    if lexeme.len() == before {
        return Err(lexical(
            LexicalErrorKind::MalformedNumber(lexeme.clone()),
            start,
        ));
    }
    Ok(())
}

fn lexical(kind: LexicalErrorKind, position: Position) -> JsonError {
    JsonError::Lexical { kind, position }
}
