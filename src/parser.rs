//! Recursive-descent parser.
//!
//! Grammar, from lowest to highest precedence:
//!
//! ```text
//! assignment -> IDENTIFIER "=" assignment | logic_or
//! logic_or   -> logic_and ( "or" logic_and )*
//! logic_and  -> equality ( "and" equality )*
//! equality   -> comparison ( ( "!=" | "==" ) comparison )*
//! comparison -> term ( ( ">" | ">=" | "<" | "<=" ) term )*
//! term       -> factor ( ( "-" | "+" ) factor )*
//! factor     -> unary ( ( "/" | "*" ) unary )*
//! unary      -> ( "!" | "-" ) unary | call
//! call       -> primary ( "(" arguments? ")" )*
//! ```

use std::rc::Rc;

use crate::ast::{Expr, FunctionDecl, Literal, Stmt};
use crate::diag::Diagnostics;
use crate::token::{Token, TokenKind};

/// Maximum number of arguments of a call and of parameters of a function.
pub const MAX_ARITY: usize = 255;

/// Unwinds the parser to the enclosing declaration after an error has been reported.
#[derive(Debug)]
struct ParseError;

type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    diags: Diagnostics,

    // Number of function bodies enclosing the current token.
    function_depth: usize,
}

impl Parser {
    /// `tokens` must end with an EOF token, as produced by the scanner.
    pub fn new(tokens: Vec<Token>) -> Parser {
        debug_assert!(tokens.last().is_some_and(Token::is_eof));
        Parser {
            tokens,
            current: 0,
            diags: Diagnostics::new(),
            function_depth: 0,
        }
    }

    /// Parses a whole program.
    ///
    /// Declarations that fail to parse are left out of the returned statements. The statements
    /// must not be executed if any diagnostic was returned.
    pub fn parse_program(mut self) -> (Vec<Stmt>, Diagnostics) {
        let mut prg = vec![];
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                prg.push(stmt);
            }
        }
        tracing::debug!(
            statements = prg.len(),
            errors = self.diags.len(),
            "parse complete"
        );
        (prg, self.diags)
    }

    /// Parses input made of a single expression.
    pub fn parse_expression(mut self) -> (Option<Expr>, Diagnostics) {
        let expr = match self.expression() {
            Ok(_) if !self.is_at_end() => {
                self.report_at_current("Expect end of expression.");
                None
            }
            Ok(expr) => Some(expr),
            Err(ParseError) => None,
        };
        (expr, self.diags)
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let stmt = match self.peek().kind {
            TokenKind::Var => {
                self.advance();
                self.var_decl()
            }
            TokenKind::Fun => {
                self.advance();
                self.fun_decl()
            }
            _ => self.statement(),
        };
        match stmt {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    /// Parse variable declaration.
    /// Previous token is `var`.
    fn var_decl(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;
        let init = if self.matches(TokenKind::Equal) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Stmt::Var(name, init))
    }

    /// Parse function declaration.
    /// Previous token is `fun`.
    fn fun_decl(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect function name.")?;
        self.consume(TokenKind::LeftParen, "Expect '(' after function name.")?;
        let mut params = vec![];
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARITY {
                    self.report_at_current("Can't have more than 255 parameters.");
                }
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;
        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.")?;

        self.function_depth += 1;
        let body = self.block();
        self.function_depth -= 1;

        Ok(Stmt::Function(Rc::new(FunctionDecl {
            name,
            params,
            body: body?,
        })))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::Print => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
                Ok(Stmt::Print(expr))
            }
            TokenKind::LeftBrace => {
                self.advance();
                Ok(Stmt::Block(self.block()?))
            }
            TokenKind::If => {
                self.advance();
                self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
                let cond = self.expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;
                let then_branch = Box::new(self.statement()?);
                let else_branch = if self.matches(TokenKind::Else) {
                    Some(Box::new(self.statement()?))
                } else {
                    None
                };
                Ok(Stmt::If(cond, then_branch, else_branch))
            }
            TokenKind::While => {
                self.advance();
                self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
                let cond = self.expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
                let body = Box::new(self.statement()?);
                Ok(Stmt::While(cond, body))
            }
            TokenKind::For => {
                self.advance();
                self.for_stmt()
            }
            TokenKind::Return => {
                let keyword = self.advance();
                if self.function_depth == 0 {
                    self.diags
                        .report_at(&keyword, "Can't return from top-level code.");
                }
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
                Ok(Stmt::Return(keyword, value))
            }
            _ => self.expression_stmt(),
        }
    }

    fn expression_stmt(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    /// Desugars `for (init; cond; incr) body` into `{ init; while (cond) { body; incr; } }`.
    /// Previous token is `for`.
    fn for_stmt(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;
        let init = if self.matches(TokenKind::Semicolon) {
            None
        } else if self.matches(TokenKind::Var) {
            Some(self.var_decl()?)
        } else {
            Some(self.expression_stmt()?)
        };

        let cond = if self.check(TokenKind::Semicolon) {
            Expr::Literal(Literal::Bool(true))
        } else {
            self.expression()?
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let incr = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;
        if let Some(incr) = incr {
            body = Stmt::Block(vec![body, Stmt::Expression(incr)]);
        }
        body = Stmt::While(cond, Box::new(body));
        if let Some(init) = init {
            body = Stmt::Block(vec![init, body]);
        }
        Ok(body)
    }

    /// Parse the rest of a block.
    /// Previous token is `{`.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = vec![];
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(stmts)
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let lhs = self.logic_or()?;
        if !self.matches(TokenKind::Equal) {
            return Ok(lhs);
        }

        let equals = self.previous().clone();
        let rhs = self.assignment()?;
        match lhs {
            Expr::Variable(name) => Ok(Expr::Assign(name, Box::new(rhs))),
            lhs => {
                // Reported but not raised: the parser is not confused.
                self.diags.report_at(&equals, "Invalid assignment target.");
                Ok(lhs)
            }
        }
    }

    fn logic_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.logic_and()?;
        while self.matches(TokenKind::Or) {
            let op = self.previous().clone();
            let rhs = self.logic_and()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(rhs));
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(TokenKind::And) {
            let op = self.previous().clone();
            let rhs = self.equality()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(rhs));
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.left_assoc(
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.left_assoc(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.left_assoc(&[TokenKind::Minus, TokenKind::Plus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.left_assoc(&[TokenKind::Slash, TokenKind::Star], Self::unary)
    }

    /// Parse a left-associative sequence of binary operators from `ops`.
    fn left_assoc(
        &mut self,
        ops: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;
        while ops.contains(&self.peek().kind) {
            let op = self.advance();
            let rhs = operand(self)?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(rhs));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        match self.peek().kind {
            TokenKind::Bang | TokenKind::Minus => {
                let op = self.advance();
                Ok(Expr::Unary(op, Box::new(self.unary()?)))
            }
            _ => self.call(),
        }
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        while self.matches(TokenKind::LeftParen) {
            let mut args = vec![];
            if !self.check(TokenKind::RightParen) {
                loop {
                    if args.len() >= MAX_ARITY {
                        self.report_at_current("Can't have more than 255 arguments.");
                    }
                    args.push(self.expression()?);
                    if !self.matches(TokenKind::Comma) {
                        break;
                    }
                }
            }
            let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
            expr = Expr::Call(Box::new(expr), paren, args);
        }
        Ok(expr)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let expr = match self.peek().kind {
            TokenKind::False => Expr::Literal(Literal::Bool(false)),
            TokenKind::True => Expr::Literal(Literal::Bool(true)),
            TokenKind::Nil => Expr::Literal(Literal::Nil),
            TokenKind::Number | TokenKind::String => {
                Expr::Literal(self.peek().literal.clone().unwrap_or(Literal::Nil))
            }
            TokenKind::Identifier => Expr::Variable(self.peek().clone()),
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
                return Ok(Expr::Grouping(Box::new(expr)));
            }
            _ => return Err(self.error_at_current("Expect expression.")),
        };
        self.advance();
        Ok(expr)
    }

    /// Discards tokens up to the start of the next statement.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Returns the current token and moves past it, except at EOF.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Consumes the current token if it is of the given kind.
    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn report_at_current(&mut self, message: &str) {
        self.diags.report_at(&self.tokens[self.current], message);
    }

    fn error_at_current(&mut self, message: &str) -> ParseError {
        self.report_at_current(message);
        ParseError
    }
}
