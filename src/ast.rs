use std::rc::Rc;

use crate::token::Token;

/// Constant value appearing in the source.
///
/// Also carried by number and string tokens, which only ever hold `Number` or `Str`.
#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Nil,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
    Var(Token, Option<Expr>),
    Block(Vec<Stmt>),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Expr, Box<Stmt>),
    /// Shared so that every function value created from it can point back at it.
    Function(Rc<FunctionDecl>),
    /// The keyword token locates errors.
    Return(Token, Option<Expr>),
}

#[derive(Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Literal(Literal),
    Grouping(Box<Expr>),
    Unary(Token, Box<Expr>),
    Binary(Box<Expr>, Token, Box<Expr>),
    /// Operator is `and` or `or`.
    Logical(Box<Expr>, Token, Box<Expr>),
    Variable(Token),
    Assign(Token, Box<Expr>),
    /// Callee, closing parenthesis and arguments.
    Call(Box<Expr>, Token, Vec<Expr>),
}
