//! Recursive-descent parser.
//!
//! One method per grammar rule, lowest precedence first:
//!
//! ```text
//! program     → declaration* EOF
//! declaration → "fun" function | "var" varDecl | statement
//! function    → IDENT "(" ( IDENT ( "," IDENT )* )? ")" block
//! varDecl     → IDENT ( "=" expression )? ";"
//! statement   → print | block | if | while | for | return | exprStmt
//! expression  → assignment
//! assignment  → IDENT "=" assignment | or
//! or          → and ( "or" and )*
//! and         → equality ( "and" equality )*
//! equality    → comparison ( ( "!=" | "==" ) comparison )*
//! comparison  → term ( ( ">" | ">=" | "<" | "<=" ) term )*
//! term        → factor ( ( "-" | "+" ) factor )*
//! factor      → unary ( ( "/" | "*" ) unary )*
//! unary       → ( "!" | "-" ) unary | call
//! call        → primary ( "(" ( expression ( "," expression )* )? ")" )*
//! primary     → NUMBER | STRING | "true" | "false" | "nil" | IDENT | "(" expression ")"
//! ```
//!
//! A failing declaration records one diagnostic, the parser skips to the
//! next statement boundary and carries on, so a single pass reports every
//! independent syntax error. `for` loops never reach later passes: they are
//! rewritten into `while` here.

use std::rc::Rc;

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};

use log::{debug, info};

/// Upper bound on call arguments and function parameters.
pub const MAX_ARITY: usize = 255;

/// Top‑level parser over an owned, EOF‑terminated token buffer.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    next_id: usize,
    errors: Vec<LoxError>,
}

impl Parser {
    /// Construct a new parser. Node identities start at zero.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_first_id(tokens, 0)
    }

    /// Construct a parser whose node identities start at `first_id`.
    ///
    /// A long-lived interpreter that parses several programs (REPL lines)
    /// must never see the same [`ExprId`] twice.
    pub fn with_first_id(mut tokens: Vec<Token>, first_id: usize) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        if tokens.last().map_or(true, |t| t.token_type != TokenType::EOF) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenType::EOF, "", line));
        }

        Self {
            tokens,
            current: 0,
            next_id: first_id,
            errors: Vec::new(),
        }
    }

    /// Parse an entire program and return every statement that could be
    /// recovered. Diagnostics are available from [`Parser::errors`].
    pub fn parse(&mut self) -> Vec<Stmt> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        info!(
            "Parsed {} statement(s) with {} error(s)",
            statements.len(),
            self.errors.len()
        );

        statements
    }

    /// Syntax diagnostics recorded so far, in source order.
    pub fn errors(&self) -> &[LoxError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<LoxError> {
        std::mem::take(&mut self.errors)
    }

    /// The identity the next variable or assignment node would receive.
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    fn declaration(&mut self) -> Option<Stmt> {
        debug!("Entering declaration at line {}", self.peek().line);

        let result = if self.matches(TokenType::FUN) {
            self.function("function")
        } else if self.matches(TokenType::VAR) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(e) => {
                debug!("Declaration failed, synchronizing: {}", e);
                self.errors.push(e);
                self.synchronize();
                None
            }
        }
    }

    fn function(&mut self, kind: &str) -> Result<Stmt> {
        let name: Token = self
            .consume(TokenType::IDENTIFIER, &format!("Expect {kind} name."))?
            .clone();

        self.consume(
            TokenType::LEFT_PAREN,
            &format!("Expect '(' after {kind} name."),
        )?;

        let mut params: Vec<Token> = Vec::new();
        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARITY {
                    let err = LoxError::parse(self.peek(), "Can't have more than 255 parameters.");
                    self.errors.push(err);
                }

                params.push(
                    self.consume(TokenType::IDENTIFIER, "Expect parameter name.")?
                        .clone(),
                );

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after parameters.")?;
        self.consume(
            TokenType::LEFT_BRACE,
            &format!("Expect '{{' before {kind} body."),
        )?;

        let body: Vec<Stmt> = self.block()?;

        Ok(Stmt::Function(Rc::new(FunctionDecl { name, params, body })))
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self
            .consume(TokenType::IDENTIFIER, "Expect variable name.")?
            .clone();

        let initializer: Option<Expr> = if self.matches(TokenType::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expect ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> Result<Stmt> {
        if self.matches(TokenType::FOR) {
            self.for_statement()
        } else if self.matches(TokenType::IF) {
            self.if_statement()
        } else if self.matches(TokenType::WHILE) {
            self.while_statement()
        } else if self.matches(TokenType::RETURN) {
            self.return_statement()
        } else if self.matches(TokenType::LEFT_BRACE) {
            Ok(Stmt::Block(self.block()?))
        } else if self.matches(TokenType::PRINT) {
            self.print_statement()
        } else {
            self.expression_statement()
        }
    }

    /// `for (init; cond; incr) body` becomes
    /// `{ init; while (cond) { body; incr; } }`.
    fn for_statement(&mut self) -> Result<Stmt> {
        debug!("Desugaring for loop at line {}", self.previous().line);

        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'for'.")?;

        let initializer: Option<Stmt> = if self.matches(TokenType::SEMICOLON) {
            None
        } else if self.matches(TokenType::VAR) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition: Option<Expr> = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::SEMICOLON, "Expect ';' after loop condition.")?;

        let increment: Option<Expr> = if !self.check(TokenType::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after for clauses.")?;

        let mut body: Stmt = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition: Expr = condition.unwrap_or(Expr::Literal(LiteralValue::True));
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn print_statement(&mut self) -> Result<Stmt> {
        let value: Expr = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expect ';' after value.")?;

        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr: Expr = self.expression()?;
        self.consume(TokenType::SEMICOLON, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'if'.")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after if condition.")?;

        let then_branch: Box<Stmt> = Box::new(self.statement()?);
        let else_branch: Option<Box<Stmt>> = if self.matches(TokenType::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'while'.")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after condition.")?;
        let body: Box<Stmt> = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn return_statement(&mut self) -> Result<Stmt> {
        let keyword: Token = self.previous().clone();
        let value: Option<Expr> = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr> {
        let expr: Expr = self.logical_or()?;

        if self.matches(TokenType::EQUAL) {
            let equals: Token = self.previous().clone();
            let value: Expr = self.assignment()?;

            if let Expr::Variable { name, .. } = expr {
                return Ok(Expr::Assign {
                    id: self.fresh_id(),
                    name,
                    value: Box::new(value),
                });
            }

            // Reported, not thrown: the parser is not confused about where it is.
            self.errors
                .push(LoxError::parse(&equals, "Invalid assignment target."));
        }

        Ok(expr)
    }

    fn logical_or(&mut self) -> Result<Expr> {
        self.logical_level(TokenType::OR, Self::logical_and)
    }

    fn logical_and(&mut self) -> Result<Expr> {
        self.logical_level(TokenType::AND, Self::equality)
    }

    /// `next ( kind next )*`, building short-circuit nodes.
    fn logical_level(
        &mut self,
        kind: TokenType,
        next: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut expr: Expr = next(self)?;

        while self.matches(kind.clone()) {
            let operator: Token = self.previous().clone();
            let right: Expr = next(self)?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr> {
        self.binary_level(
            &[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> Result<Expr> {
        self.binary_level(
            &[
                TokenType::GREATER,
                TokenType::GREATER_EQUAL,
                TokenType::LESS,
                TokenType::LESS_EQUAL,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> Result<Expr> {
        self.binary_level(&[TokenType::MINUS, TokenType::PLUS], Self::factor)
    }

    fn factor(&mut self) -> Result<Expr> {
        self.binary_level(&[TokenType::STAR, TokenType::SLASH], Self::unary)
    }

    /// One left‑associative precedence level: `next ( op next )*`.
    fn binary_level(
        &mut self,
        operators: &[TokenType],
        next: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut expr: Expr = next(self)?;

        while operators.iter().any(|op| self.check(op.clone())) {
            let operator: Token = self.advance().clone();
            let right: Expr = next(self)?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.matches(TokenType::BANG) || self.matches(TokenType::MINUS) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.call()
    }

    fn call(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.primary()?;

        while self.matches(TokenType::LEFT_PAREN) {
            expr = self.finish_call(expr)?;
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut arguments: Vec<Expr> = Vec::new();
        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    let err = LoxError::parse(self.peek(), "Can't have more than 255 arguments.");
                    self.errors.push(err);
                }

                arguments.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        let paren: Token = self
            .consume(TokenType::RIGHT_PAREN, "Expect ')' after arguments.")?
            .clone();

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.matches(TokenType::FALSE) {
            return Ok(Expr::Literal(LiteralValue::False));
        }
        if self.matches(TokenType::TRUE) {
            return Ok(Expr::Literal(LiteralValue::True));
        }
        if self.matches(TokenType::NIL) {
            return Ok(Expr::Literal(LiteralValue::Nil));
        }

        match &self.peek().token_type {
            TokenType::NUMBER(n) => {
                let n: f64 = *n;
                self.advance();
                return Ok(Expr::Literal(LiteralValue::Number(n)));
            }
            TokenType::STRING(s) => {
                let s: String = s.clone();
                self.advance();
                return Ok(Expr::Literal(LiteralValue::Str(s)));
            }
            _ => {}
        }

        if self.matches(TokenType::IDENTIFIER) {
            let name: Token = self.previous().clone();
            return Ok(Expr::Variable {
                id: self.fresh_id(),
                name,
            });
        }

        if self.matches(TokenType::LEFT_PAREN) {
            let expr: Expr = self.expression()?;

            self.consume(TokenType::RIGHT_PAREN, "Expect ')' after expression.")?;

            return Ok(Expr::Grouping(Box::new(expr)));
        }

        Err(LoxError::parse(self.peek(), "Expect expression."))
    }

    fn fresh_id(&mut self) -> ExprId {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Consume the next token if it is of kind `kind`.
    fn matches(&mut self, kind: TokenType) -> bool {
        let hit = self.check(kind);
        if hit {
            self.advance();
        }
        hit
    }

    fn consume(&mut self, kind: TokenType, message: &str) -> Result<&Token> {
        if !self.check(kind) {
            return Err(LoxError::parse(self.peek(), message));
        }
        Ok(self.advance())
    }

    fn check(&self, kind: TokenType) -> bool {
        !self.is_at_end() && self.peek().token_type == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::EOF
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Skip ahead to just after a `;` or to a token that starts a statement.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().token_type == TokenType::SEMICOLON {
                break;
            }

            use TokenType::*;
            if matches!(
                self.peek().token_type,
                CLASS | FUN | VAR | FOR | IF | WHILE | PRINT | RETURN
            ) {
                break;
            }

            self.advance();
        }

        debug!("Resynchronized at line {}", self.peek().line);
    }
}
