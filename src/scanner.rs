//! Lexical analyzer

use std::rc::Rc;

use crate::ast::Literal;
use crate::ctx::Context;
use crate::diag::{Diagnostics, Position};
use crate::token::{Token, TokenKind};

/// Turn source text into a sequence of tokens.
///
/// Errors do not stop the scan: they are recorded and the offending input is skipped, so one pass
/// reports every lexical error of the source.
#[derive(Debug)]
pub struct Scanner<'s> {
    source: &'s str,
    ctx: Rc<Context>,

    // Byte offsets of the first character of the current lexeme and of the next character.
    start: usize,
    current: usize,
    line: Position,

    tokens: Vec<Token>,
    diags: Diagnostics,
}

impl<'s> Scanner<'s> {
    /// Creates a new scanner operating on `source`.
    pub fn new(source: &'s str, ctx: Rc<Context>) -> Scanner<'s> {
        Scanner {
            source,
            ctx,
            start: 0,
            current: 0,
            line: 1,
            tokens: Vec::new(),
            diags: Diagnostics::new(),
        }
    }

    /// Consumes the whole input.
    ///
    /// The returned token sequence always ends with an EOF token, even when errors were reported.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Diagnostics) {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        let eof = Token::new(TokenKind::Eof, self.ctx.symbol(""), None, self.line);
        self.tokens.push(eof);
        tracing::debug!(
            tokens = self.tokens.len(),
            errors = self.diags.len(),
            "scan complete"
        );
        (self.tokens, self.diags)
    }

    fn scan_token(&mut self) {
        let Some(ch) = self.advance() else {
            return;
        };
        match ch {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            '-' => self.add_token(TokenKind::Minus),
            '+' => self.add_token(TokenKind::Plus),
            ';' => self.add_token(TokenKind::Semicolon),
            '*' => self.add_token(TokenKind::Star),
            '!' => self.add_one_or_two('=', TokenKind::BangEqual, TokenKind::Bang),
            '=' => self.add_one_or_two('=', TokenKind::EqualEqual, TokenKind::Equal),
            '<' => self.add_one_or_two('=', TokenKind::LessEqual, TokenKind::Less),
            '>' => self.add_one_or_two('=', TokenKind::GreaterEqual, TokenKind::Greater),
            '/' => {
                if self.next_is('/') {
                    self.skip_comment();
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }
            '\n' => self.line += 1,
            ' ' | '\t' | '\r' => (),
            '"' => self.scan_string(),
            '0'..='9' => self.scan_number(),
            'a'..='z' | 'A'..='Z' | '_' => self.scan_identifier(),
            _ => self
                .diags
                .report(self.line, format!("Unexpected character: {}", ch)),
        }
    }

    fn add_one_or_two(&mut self, second: char, long: TokenKind, short: TokenKind) {
        let kind = if self.next_is(second) { long } else { short };
        self.add_token(kind);
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn scan_string(&mut self) {
        let first_line = self.line;
        loop {
            match self.advance() {
                None => {
                    self.diags.report(first_line, "Unterminated string.");
                    return;
                }
                Some('"') => break,
                Some('\n') => self.line += 1,
                Some(_) => (),
            }
        }

        let text = &self.source[self.start + 1..self.current - 1];
        self.add_literal_token(TokenKind::String, Literal::Str(Rc::from(text)));
    }

    fn scan_number(&mut self) {
        self.skip_digits();

        // A dot belongs to the number only when a digit follows it.
        if self.peek() == Some('.') && self.peek_next().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
            self.skip_digits();
        }

        let text = &self.source[self.start..self.current];
        let n = text.parse::<f64>().unwrap_or_default();
        self.add_literal_token(TokenKind::Number, Literal::Number(n));
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_identifier(&mut self) {
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        {
            self.advance();
        }

        let sym = self.ctx.symbol(&self.source[self.start..self.current]);
        let kind = self.ctx.keyword(&sym).unwrap_or(TokenKind::Identifier);
        self.tokens.push(Token::new(kind, sym, None, self.line));
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme = self.ctx.symbol(&self.source[self.start..self.current]);
        self.tokens.push(Token::new(kind, lexeme, None, self.line));
    }

    fn add_literal_token(&mut self, kind: TokenKind, literal: Literal) {
        let lexeme = self.ctx.symbol(&self.source[self.start..self.current]);
        self.tokens
            .push(Token::new(kind, lexeme, Some(literal), self.line));
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.current += ch.len_utf8();
        Some(ch)
    }

    /// Consumes the next character if it is `expected`.
    fn next_is(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.current += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        self.source[self.current..].chars().nth(1)
    }
}
