//! A tree-walking interpreter for the Lox language.
//!
//! See [Crafting Interpreters](https://craftinginterpreters.com/).
//!
//! Source text goes through the scanner, the parser and the evaluator. Lexical and syntax
//! errors are accumulated over the whole source and reported together; the program only runs
//! when there are none.
//!
//! # Examples
//!
//! See [`crate::interpreter::Interpreter`].
//!
//! # Limitations
//!
//! - No classes: `class`, `this` and `super` are reserved but have no grammar.
//! - No static resolution pass: variables are looked up by name at run time.
//! - Deep recursion in Lox programs overflows the host stack.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]

pub mod ast;
pub mod diag;
pub mod interpreter;
pub mod token;
pub mod value;

mod ast_printer;
mod ctx;
mod environment;
mod eval;
mod function;
mod interner;
mod parser;
mod scanner;

pub use diag::{Diagnostic, Diagnostics};
pub use eval::RuntimeError;
pub use interpreter::{Interpreter, LoxError};
pub use value::Value;
