//! API to control the interpreter.

use std::io::prelude::*;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::Expr;
use crate::ctx::Context;
use crate::diag::Diagnostics;
use crate::eval::{Evaluator, RuntimeError};
use crate::parser::Parser;
use crate::scanner::Scanner;
use crate::token::Token;
use crate::value::Value;

/// Tree-walk interpreter.
///
/// Global definitions persist across calls, which is what the REPL relies on.
///
/// # Example
///
/// Invoke the interpreter a first time to define a function then additional times to call this
/// function:
///
/// ```
/// # use tlox::interpreter::{Interpreter, LoxError};
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// let func_def = r#"
///     fun max(x, y) {
///         if (x > y) {
///             return x;
///         } else {
///             return y;
///         }
///     }
/// "#;
/// interp.run(func_def)?;
///
/// interp.run("print max(10, 20);").expect("interpreter error");
/// interp.run("print max(5, 4);").expect("interpreter error");
///
/// assert_eq!(output, b"20\n5\n");
/// # Ok::<(), LoxError>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    ctx: Rc<Context>,
    evaluator: Evaluator<'t, W>,
}

/// Errors the interpreter can raise.
#[derive(Debug, Error)]
pub enum LoxError {
    /// Lexical or syntax errors. Nothing was executed.
    #[error("{0}")]
    Static(Diagnostics),

    /// Error occurring during evaluation.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl LoxError {
    /// Process exit status conventionally associated with the error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Static(_) => 65,
            LoxError::Runtime(_) => 70,
        }
    }
}

impl<W: Write> Interpreter<'_, W> {
    pub fn new(output: &mut W) -> Interpreter<'_, W> {
        let ctx = Context::new();
        Interpreter {
            evaluator: Evaluator::new(output, &ctx),
            ctx,
        }
    }

    /// Scans `source`.
    ///
    /// Tokens are returned even when errors were reported; the scanner skips bad input.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn tokenize(&self, source: &str) -> (Vec<Token>, Diagnostics) {
        Scanner::new(source, Rc::clone(&self.ctx)).scan_tokens()
    }

    /// Scans and parses `source` made of a single expression.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse_expression(&self, source: &str) -> Result<Expr, LoxError> {
        let (tokens, mut diags) = self.tokenize(source);
        let (expr, mut parse_diags) = Parser::new(tokens).parse_expression();
        diags.append(&mut parse_diags);
        match expr {
            Some(expr) if !diags.has_errors() => Ok(expr),
            _ => Err(LoxError::Static(diags)),
        }
    }

    /// Evaluates `source` made of a single expression.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate(&mut self, source: &str) -> Result<Value, LoxError> {
        let expr = self.parse_expression(source)?;
        Ok(self.evaluator.eval_expr_in_global_env(&expr)?)
    }

    /// Runs the program in `source`.
    ///
    /// The program is not executed at all if any lexical or syntax error was found.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, source: &str) -> Result<(), LoxError> {
        let (tokens, mut diags) = self.tokenize(source);
        let (prg, mut parse_diags) = Parser::new(tokens).parse_program();
        diags.append(&mut parse_diags);
        if diags.has_errors() {
            return Err(LoxError::Static(diags));
        }
        self.evaluator.exec_stmts_in_global_env(&prg)?;
        Ok(())
    }
}
