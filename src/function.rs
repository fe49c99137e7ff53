//! Callable values: host-provided natives and Lox functions.

use std::fmt;
use std::io::prelude::*;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::FunctionDecl;
use crate::environment::Env;
use crate::eval::{Evaluator, Flow, RuntimeError};
use crate::token::Token;
use crate::value::Value;

/// Signature of host functions. The error is the message of the runtime error to raise.
pub type NativeFn = fn(&[Value]) -> Result<Value, String>;

pub enum Function {
    Native(NativeFunction),
    Lox(LoxFunction),
}

#[derive(Debug)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub body: NativeFn,
}

/// A function declaration paired with the scope it was declared in.
pub struct LoxFunction {
    pub decl: Rc<FunctionDecl>,
    pub closure: Rc<Env>,
}

impl Function {
    /// Number of arguments a call must pass.
    pub fn arity(&self) -> usize {
        match self {
            Function::Native(native) => native.arity,
            Function::Lox(lox) => lox.decl.params.len(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Function::Native(native) => native.name,
            Function::Lox(lox) => lox.decl.name.lexeme.name(),
        }
    }

    /// Invokes the function. The caller has already checked the number of arguments.
    ///
    /// `paren` locates errors raised by native functions.
    pub fn call<W: Write>(
        &self,
        evaluator: &mut Evaluator<'_, W>,
        paren: &Token,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        debug_assert_eq!(args.len(), self.arity());
        tracing::trace!(function = self.name(), args = args.len(), "call");
        match self {
            Function::Native(native) => {
                (native.body)(&args).map_err(|msg| RuntimeError::new(paren, msg))
            }
            Function::Lox(lox) => {
                let env = Env::with_parent(Rc::clone(&lox.closure));
                for (param, arg) in lox.decl.params.iter().zip(args) {
                    env.define(param.lexeme.clone(), arg);
                }
                match evaluator.exec_block(&lox.decl.body, env)? {
                    Flow::Return(val) => Ok(val),
                    Flow::Normal => Ok(Value::Nil),
                }
            }
        }
    }
}

// Closures are not dumped: the captured scope may hold the function itself.
impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.decl.name.lexeme.name())
            .field("params", &self.decl.params.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .field("native", &matches!(self, Function::Native(_)))
            .finish()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Native(_) => write!(f, "<native fn>"),
            Function::Lox(lox) => write!(f, "<fn {}>", lox.decl.name.lexeme),
        }
    }
}

/// Seconds elapsed since the Unix epoch.
pub fn native_clock(_args: &[Value]) -> Result<Value, String> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| Value::Number(elapsed.as_secs_f64()))
        .map_err(|e| format!("Clock error: {}.", e))
}
