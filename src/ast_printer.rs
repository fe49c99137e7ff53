//! Parenthesized rendering of expressions, as printed by the `parse` command.
//!
//! `1 + 2 * 3` renders as `(+ 1.0 (* 2.0 3.0))`.

use std::fmt;

use crate::ast::{Expr, Literal};

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Nil => write!(f, "nil"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Number(n) => {
                // Always keep a fractional part, unlike runtime values.
                write!(f, "{}", n)?;
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, ".0")?;
                }
                Ok(())
            }
            Literal::Str(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Grouping(e) => write!(f, "(group {})", e),
            Expr::Unary(op, e) => write!(f, "({} {})", op.lexeme, e),
            Expr::Binary(l, op, r) | Expr::Logical(l, op, r) => {
                write!(f, "({} {} {})", op.lexeme, l, r)
            }
            Expr::Variable(name) => write!(f, "{}", name.lexeme),
            Expr::Assign(name, e) => write!(f, "(= {} {})", name.lexeme, e),
            Expr::Call(callee, _, args) => {
                write!(f, "(call {}", callee)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
