//! Lexical scopes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::eval::RuntimeError;
use crate::interner::Symbol;
use crate::token::Token;
use crate::value::Value;

/// One scope of the environment chain.
///
/// Scopes are reference counted: a scope is kept alive by the evaluator while its block runs and
/// by every closure declared in it.
#[derive(Debug, Default)]
pub struct Env {
    parent: Option<Rc<Env>>,
    bindings: RefCell<HashMap<Symbol, Value>>,
}

impl Env {
    pub fn new() -> Rc<Env> {
        Rc::new(Env::default())
    }

    pub fn with_parent(parent: Rc<Env>) -> Rc<Env> {
        Rc::new(Env {
            parent: Some(parent),
            bindings: RefCell::new(HashMap::new()),
        })
    }

    /// Binds `name` in this scope, replacing any previous binding of the same scope.
    pub fn define(&self, name: Symbol, val: Value) {
        self.bindings.borrow_mut().insert(name, val);
    }

    /// Looks `name` up from this scope outwards.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(val) = self.bindings.borrow().get(&name.lexeme) {
            return Ok(val.clone());
        }
        match &self.parent {
            Some(parent) => parent.get(name),
            None => Err(undefined(name)),
        }
    }

    /// Overwrites the innermost existing binding of `name`.
    pub fn assign(&self, name: &Token, val: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.bindings.borrow_mut().get_mut(&name.lexeme) {
            *slot = val;
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.assign(name, val),
            None => Err(undefined(name)),
        }
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))
}
