//! Recursive-descent parser from tokens to a [`Value`] tree.
//!
//! ```text
//! value  := object | array | string | int | float | true | false | null
//! object := '{' (string ':' value (',' string ':' value)*)? '}'
//! array  := '[' (value (',' value)*)? ']'
//! ```
//!
//! Each rule looks only at the current token. Duplicate object keys keep the
//! last value. A trailing comma is rejected because the rule after `,`
//! requires another key or value.

use crate::error::{Expected, JsonError, Result};
use crate::lexer::{decode_string, Tokenizer};
use crate::options::ParseOptions;
use crate::token::{Token, TokenKind};
use crate::value::{Map, Value};

/// Parse `text` as exactly one value followed by end of input.
pub fn parse(text: &str) -> Result<Value> {
    parse_with(text, &ParseOptions::default())
}

pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Value> {
    let mut parser = Parser::with_options(text, options)?;
    let value = parser.parse_value()?;
    parser.finish()?;
    Ok(value)
}

/// Parse a whole document that must be an object.
pub fn parse_object(text: &str) -> Result<Map> {
    let mut parser = Parser::new(text)?;
    let map = parser.parse_object()?;
    parser.finish()?;
    Ok(map)
}

/// Parse a whole document that must be an array.
pub fn parse_array(text: &str) -> Result<Vec<Value>> {
    let mut parser = Parser::new(text)?;
    let items = parser.parse_array()?;
    parser.finish()?;
    Ok(items)
}

/// Single-use parser holding the tokenizer's lookahead state.
#[derive(Debug)]
pub struct Parser<'a> {
    tokens: Tokenizer<'a>,
    max_depth: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str) -> Result<Self> {
        Self::with_options(text, &ParseOptions::default())
    }

    pub fn with_options(text: &'a str, options: &ParseOptions) -> Result<Self> {
        Ok(Self {
            tokens: Tokenizer::new(text)?,
            max_depth: options.max_depth,
            depth: 0,
        })
    }

    /// Require that every token has been consumed.
    pub fn finish(&self) -> Result<()> {
        self.check(TokenKind::Eof)
    }

    /// Parse whatever value starts at the current token.
    pub fn parse_value(&mut self) -> Result<Value> {
        match self.current().kind {
            TokenKind::BraceOpen => self.parse_object().map(Value::Object),
            TokenKind::BracketOpen => self.parse_array().map(Value::Array),
            TokenKind::String => self.parse_string().map(Value::String),
            TokenKind::Int => self.parse_int(),
            TokenKind::Float => self.parse_float().map(Value::Float),
            TokenKind::True | TokenKind::False => self.parse_bool().map(Value::Bool),
            TokenKind::Null => self.parse_null().map(|()| Value::Null),
            _ => Err(self.unexpected(Expected::Value)),
        }
    }

    pub fn parse_object(&mut self) -> Result<Map> {
        self.expect(TokenKind::BraceOpen)?;
        self.enter()?;
        let mut map = Map::new();

        if self.current().kind == TokenKind::BraceClose {
            self.tokens.take()?;
            self.depth -= 1;
            return Ok(map);
        }

        loop {
            let name = self.parse_string()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_value()?;
            map.insert(name, value);

            if self.current().kind == TokenKind::Comma {
                self.tokens.take()?;
                continue;
            }
            self.expect(TokenKind::BraceClose)?;
            break;
        }

        self.depth -= 1;
        Ok(map)
    }

    pub fn parse_array(&mut self) -> Result<Vec<Value>> {
        self.expect(TokenKind::BracketOpen)?;
        self.enter()?;
        let mut items = Vec::new();

        if self.current().kind == TokenKind::BracketClose {
            self.tokens.take()?;
            self.depth -= 1;
            return Ok(items);
        }

        loop {
            items.push(self.parse_value()?);

            if self.current().kind == TokenKind::Comma {
                self.tokens.take()?;
                continue;
            }
            self.expect(TokenKind::BracketClose)?;
            break;
        }

        self.depth -= 1;
        Ok(items)
    }

    pub fn parse_string(&mut self) -> Result<String> {
        Ok(decode_string(&self.expect(TokenKind::String)?.text))
    }

    /// Parse an integer literal. Literals beyond the `i64` range come back
    /// as `Value::Float`.
    pub fn parse_int(&mut self) -> Result<Value> {
        let token = self.expect(TokenKind::Int)?;
        match token.text.parse::<i64>() {
            Ok(i) => Ok(Value::Int(i)),
            Err(_) => Ok(Value::Float(float_lexeme(&token))),
        }
    }

    pub fn parse_float(&mut self) -> Result<f64> {
        let token = self.expect(TokenKind::Float)?;
        Ok(float_lexeme(&token))
    }

    pub fn parse_bool(&mut self) -> Result<bool> {
        match self.current().kind {
            TokenKind::True => {
                self.tokens.take()?;
                Ok(true)
            }
            TokenKind::False => {
                self.tokens.take()?;
                Ok(false)
            }
            _ => Err(self.unexpected(Expected::Token(TokenKind::True))),
        }
    }

    pub fn parse_null(&mut self) -> Result<()> {
        self.expect(TokenKind::Null).map(|_| ())
    }

    fn current(&self) -> &Token {
        self.tokens.peek()
    }

    fn check(&self, kind: TokenKind) -> Result<()> {
        if self.current().kind == kind {
            Ok(())
        } else {
            Err(self.unexpected(Expected::Token(kind)))
        }
    }

    /// Consume the current token if it has the given kind.
    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        self.check(kind)?;
        self.tokens.take()
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(JsonError::DepthLimit {
                limit: self.max_depth,
                position: self.current().position,
            });
        }
        Ok(())
    }

    fn unexpected(&self, expected: Expected) -> JsonError {
        let token = self.current();
        JsonError::Syntax {
            expected,
            found: token.kind,
            position: token.position,
        }
    }
}

/// The tokenizer only emits digit/sign/`.`/exponent lexemes, all of which
/// `f64::from_str` accepts.
fn float_lexeme(token: &Token) -> f64 {
    token.text.parse::<f64>().unwrap_or(f64::NAN)
}
