//! Lexer for equation source text.
//!
//! Converts source text into a flat stream of [`Token`]s, always terminated
//! by a single [`TokenKind::Eof`]. Stops at the first unrecognised character.

use super::error::CompileError;
use super::token::{Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    position: self.pos,
                });
                break;
            }

            let ch = self.peek();
            let token = match ch {
                '+' => self.single_char(TokenKind::Plus),
                '-' => self.single_char(TokenKind::Minus),
                '*' => self.single_char(TokenKind::Star),
                '/' => self.single_char(TokenKind::Slash),
                '^' => self.single_char(TokenKind::Caret),
                '(' => self.single_char(TokenKind::LParen),
                ')' => self.single_char(TokenKind::RParen),
                '|' => self.single_char(TokenKind::Pipe),
                ',' => self.single_char(TokenKind::Comma),
                '.' if self.peek_next().is_some_and(|c| c.is_ascii_digit()) => {
                    self.lex_number()?
                }
                '0'..='9' => self.lex_number()?,
                'a'..='z' | 'A'..='Z' | '_' => self.lex_ident(),
                _ => {
                    return Err(CompileError::lex(
                        format!("unexpected character '{ch}'"),
                        self.pos,
                    ));
                }
            };

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && matches!(self.peek(), ' ' | '\t' | '\n' | '\r') {
            self.advance();
        }
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let position = self.pos;
        let ch = self.advance();
        Token {
            kind,
            text: ch.to_string(),
            position,
        }
    }

    /// Lex `digits`, `digits.digits`, `.digits` or `digits.`.
    fn lex_number(&mut self) -> Result<Token, CompileError> {
        let position = self.pos;
        let mut text = String::new();

        while !self.is_at_end() && self.peek().is_ascii_digit() {
            text.push(self.advance());
        }

        if !self.is_at_end() && self.peek() == '.' {
            text.push(self.advance());
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                text.push(self.advance());
            }
        }

        let mut normalized = text.clone();
        if normalized.starts_with('.') {
            normalized.insert(0, '0');
        }
        if normalized.ends_with('.') {
            normalized.push('0');
        }

        let value: f64 = normalized
            .parse()
            .map_err(|_| CompileError::lex(format!("invalid number: {text}"), position))?;
        if !value.is_finite() {
            return Err(CompileError::lex(
                format!("number out of range: {text}"),
                position,
            ));
        }

        Ok(Token {
            kind: TokenKind::Number(value),
            text,
            position,
        })
    }

    fn lex_ident(&mut self) -> Token {
        let position = self.pos;
        let mut text = String::new();

        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == '_') {
            text.push(self.advance());
        }

        Token {
            kind: TokenKind::Ident(text.clone()),
            text,
            position,
        }
    }
}

/// Tokenize `source` in one call.
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    Lexer::new(source).tokenize()
}
