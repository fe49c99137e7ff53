//! Static (lexical and syntax) diagnostics.

use std::fmt;

use crate::token::Token;

/// Line number (starting at one).
pub type Position = u32;

/// One lexical or syntax error.
#[derive(Debug, PartialEq, Clone)]
pub struct Diagnostic {
    pub line: Position,
    /// What the error is attached to: `end` or a quoted lexeme. `None` for lexical errors.
    pub location: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "[line {}] Error at {}: {}", self.line, loc, self.message),
            None => write!(f, "[line {}] Error: {}", self.line, self.message),
        }
    }
}

/// Sink accumulating diagnostics over a whole scan and parse pass.
///
/// The caller inspects it once both passes are done and refuses to execute the program if it is
/// not empty.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics(Vec::new())
    }

    /// Records an error that is not attached to a token.
    pub fn report(&mut self, line: Position, message: impl Into<String>) {
        self.push(Diagnostic {
            line,
            location: None,
            message: message.into(),
        });
    }

    /// Records an error located at `token`.
    pub fn report_at(&mut self, token: &Token, message: impl Into<String>) {
        let location = if token.is_eof() {
            "end".to_string()
        } else {
            format!("'{}'", token.lexeme)
        };
        self.push(Diagnostic {
            line: token.line,
            location: Some(location),
            message: message.into(),
        });
    }

    fn push(&mut self, diag: Diagnostic) {
        tracing::debug!(line = diag.line, message = %diag.message, "diagnostic recorded");
        self.0.push(diag);
    }

    pub fn has_errors(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Moves all diagnostics of `other` at the end of this sink.
    pub fn append(&mut self, other: &mut Diagnostics) {
        self.0.append(&mut other.0);
    }
}

/// One diagnostic per line.
impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diag) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diag)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::Context;
    use crate::token::TokenKind;

    #[test]
    fn lexical_error_has_no_location() {
        let mut diags = Diagnostics::new();
        diags.report(3, "Unexpected character: @");
        assert_eq!(diags.to_string(), "[line 3] Error: Unexpected character: @");
    }

    #[test]
    fn error_at_token_quotes_lexeme() {
        let ctx = Context::new();
        let token = Token::new(TokenKind::Semicolon, ctx.symbol(";"), None, 2);
        let mut diags = Diagnostics::new();
        diags.report_at(&token, "Expect expression.");
        assert_eq!(diags.to_string(), "[line 2] Error at ';': Expect expression.");
    }

    #[test]
    fn diagnostics_keep_report_order_and_location() {
        let ctx = Context::new();
        let token = Token::new(TokenKind::Identifier, ctx.symbol("x"), None, 4);
        let mut diags = Diagnostics::new();
        diags.report(1, "Unterminated string.");
        diags.report_at(&token, "Expect ';' after value.");
        let located = diags
            .iter()
            .map(|d| (d.line, d.location.clone()))
            .collect::<Vec<_>>();
        assert_eq!(located, vec![(1, None), (4, Some("'x'".to_string()))]);
    }

    #[test]
    fn error_at_eof_says_end() {
        let ctx = Context::new();
        let token = Token::new(TokenKind::Eof, ctx.symbol(""), None, 7);
        let mut diags = Diagnostics::new();
        diags.report_at(&token, "Expect ';' after value.");
        assert_eq!(diags.to_string(), "[line 7] Error at end: Expect ';' after value.");
    }

    #[test]
    fn diagnostics_accumulate_one_per_line() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_errors());
        diags.report(1, "Unterminated string.");
        diags.report(4, "Unexpected character: #");
        assert_eq!(diags.len(), 2);
        assert_eq!(
            diags.to_string(),
            "[line 1] Error: Unterminated string.\n[line 4] Error: Unexpected character: #"
        );
    }
}
