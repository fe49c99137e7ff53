use std::io;
use std::io::prelude::*;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::{Expr, Stmt};
use crate::ctx::Context;
use crate::environment::Env;
use crate::function::{native_clock, Function, LoxFunction, NativeFunction};
use crate::token::{Token, TokenKind};
use crate::value::Value;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Error raised by the program being run, located at `token`.
    #[error("{message}\n[line {}]", .token.line)]
    Failure { token: Token, message: String },

    /// The output of a `print` statement could not be written.
    #[error("output error: {0}")]
    Output(#[from] io::Error),
}

impl RuntimeError {
    pub fn new(token: &Token, message: impl Into<String>) -> RuntimeError {
        RuntimeError::Failure {
            token: token.clone(),
            message: message.into(),
        }
    }
}

/// How a statement completed.
#[derive(Debug, PartialEq)]
pub enum Flow {
    Normal,
    /// A `return` statement ran; enclosing statements are skipped up to the nearest call.
    Return(Value),
}

/// Tree-walk evaluator.
///
/// Scopes are threaded through the `exec_*` and `eval_*` methods rather than stored: returning
/// from a method, including with an error, leaves the caller's scope in place.
#[derive(Debug)]
pub struct Evaluator<'t, W: Write> {
    output: &'t mut W,
    globals: Rc<Env>,
}

impl<'a, W: Write> Evaluator<'a, W> {
    pub fn new(output: &'a mut W, ctx: &Context) -> Evaluator<'a, W> {
        let globals = Env::new();
        globals.define(
            ctx.symbol("clock"),
            Value::Callable(Rc::new(Function::Native(NativeFunction {
                name: "clock",
                arity: 0,
                body: native_clock,
            }))),
        );
        Evaluator { output, globals }
    }

    /// Runs a program in the global scope, which persists across calls.
    pub fn exec_stmts_in_global_env(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        let globals = Rc::clone(&self.globals);
        for stmt in stmts {
            // The parser rejects `return` outside functions.
            if let Flow::Return(_) = self.exec_stmt(stmt, &globals)? {
                break;
            }
        }
        Ok(())
    }

    /// Evaluates an expression in the global scope.
    pub fn eval_expr_in_global_env(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        let globals = Rc::clone(&self.globals);
        self.eval_expr(expr, &globals)
    }

    /// Runs `stmts` in `env`, which is dropped afterwards unless a closure captured it.
    pub(crate) fn exec_block(&mut self, stmts: &[Stmt], env: Rc<Env>) -> Result<Flow, RuntimeError> {
        for stmt in stmts {
            if let Flow::Return(val) = self.exec_stmt(stmt, &env)? {
                return Ok(Flow::Return(val));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, env: &Rc<Env>) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expression(e) => {
                self.eval_expr(e, env)?;
            }
            Stmt::Print(e) => {
                let v = self.eval_expr(e, env)?;
                writeln!(self.output, "{}", v)?;
            }
            Stmt::Var(name, init) => {
                let val = match init {
                    Some(e) => self.eval_expr(e, env)?,
                    None => Value::Nil,
                };
                env.define(name.lexeme.clone(), val);
            }
            Stmt::Block(stmts) => {
                return self.exec_block(stmts, Env::with_parent(Rc::clone(env)));
            }
            Stmt::If(cond, then_branch, else_branch) => {
                if self.eval_expr(cond, env)?.is_truthy() {
                    return self.exec_stmt(then_branch, env);
                } else if let Some(else_branch) = else_branch {
                    return self.exec_stmt(else_branch, env);
                }
            }
            Stmt::While(cond, body) => {
                while self.eval_expr(cond, env)?.is_truthy() {
                    if let Flow::Return(val) = self.exec_stmt(body, env)? {
                        return Ok(Flow::Return(val));
                    }
                }
            }
            Stmt::Function(decl) => {
                let func = Function::Lox(LoxFunction {
                    decl: Rc::clone(decl),
                    closure: Rc::clone(env),
                });
                env.define(decl.name.lexeme.clone(), Value::Callable(Rc::new(func)));
            }
            Stmt::Return(_, e) => {
                let val = match e {
                    Some(e) => self.eval_expr(e, env)?,
                    None => Value::Nil,
                };
                return Ok(Flow::Return(val));
            }
        };
        Ok(Flow::Normal)
    }

    fn eval_expr(&mut self, expr: &Expr, env: &Rc<Env>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit) => Ok(Value::from(lit)),
            Expr::Grouping(e) => self.eval_expr(e, env),
            Expr::Variable(name) => env.get(name),
            Expr::Assign(name, rhs) => {
                let val = self.eval_expr(rhs, env)?;
                env.assign(name, val.clone())?;
                Ok(val)
            }
            Expr::Unary(op, operand) => {
                let val = self.eval_expr(operand, env)?;
                match op.kind {
                    TokenKind::Minus => match val {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::new(op, "Operand must be a number.")),
                    },
                    TokenKind::Bang => Ok(Value::Bool(!val.is_truthy())),
                    _ => Err(unknown_operator(op)),
                }
            }
            Expr::Logical(lhs, op, rhs) => {
                let l = self.eval_expr(lhs, env)?;
                let short_circuits = match op.kind {
                    TokenKind::Or => l.is_truthy(),
                    _ => !l.is_truthy(),
                };
                if short_circuits {
                    Ok(l)
                } else {
                    self.eval_expr(rhs, env)
                }
            }
            Expr::Binary(lhs, op, rhs) => {
                let l = self.eval_expr(lhs, env)?;
                let r = self.eval_expr(rhs, env)?;
                binary(op, l, r)
            }
            Expr::Call(callee, paren, args) => {
                let callee = self.eval_expr(callee, env)?;
                let args = args
                    .iter()
                    .map(|a| self.eval_expr(a, env))
                    .collect::<Result<Vec<Value>, RuntimeError>>()?;
                let Value::Callable(func) = callee else {
                    return Err(RuntimeError::new(
                        paren,
                        "Can only call functions and classes.",
                    ));
                };
                if args.len() != func.arity() {
                    return Err(RuntimeError::new(
                        paren,
                        format!(
                            "Expected {} arguments but got {}.",
                            func.arity(),
                            args.len()
                        ),
                    ));
                }
                func.call(self, paren, args)
            }
        }
    }
}

fn binary(op: &Token, l: Value, r: Value) -> Result<Value, RuntimeError> {
    match op.kind {
        TokenKind::EqualEqual => return Ok(Value::Bool(l == r)),
        TokenKind::BangEqual => return Ok(Value::Bool(l != r)),
        TokenKind::Plus => {
            return match (l, r) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (Value::Str(l), Value::Str(r)) => {
                    Ok(Value::Str(Rc::from(format!("{}{}", l, r))))
                }
                _ => Err(RuntimeError::new(
                    op,
                    "Operands must be two numbers or two strings.",
                )),
            }
        }
        _ => (),
    }

    let (Value::Number(l), Value::Number(r)) = (l, r) else {
        return Err(RuntimeError::new(op, "Operands must be numbers."));
    };
    match op.kind {
        TokenKind::Minus => Ok(Value::Number(l - r)),
        TokenKind::Star => Ok(Value::Number(l * r)),
        TokenKind::Slash => Ok(Value::Number(l / r)),
        TokenKind::Greater => Ok(Value::Bool(l > r)),
        TokenKind::GreaterEqual => Ok(Value::Bool(l >= r)),
        TokenKind::Less => Ok(Value::Bool(l < r)),
        TokenKind::LessEqual => Ok(Value::Bool(l <= r)),
        _ => Err(unknown_operator(op)),
    }
}

// Only reachable with a hand-built tree: the parser never produces such nodes.
fn unknown_operator(op: &Token) -> RuntimeError {
    RuntimeError::new(op, format!("Unknown operator '{}'.", op.lexeme))
}
