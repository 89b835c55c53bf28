//! Abstract syntax tree produced by the [`Parser`](crate::parser::Parser).
//!
//! Two closed node families: [`Expr`] and [`Stmt`]. Every consumer (resolver,
//! interpreter, printer) is an exhaustive `match` over them. Nodes own their
//! children; the tree is immutable once parsed.

use serde::Serialize;
use std::fmt;
use std::rc::Rc;

use crate::token::Token;

/// Identity of a variable-reference or assignment node.
///
/// The resolver keys its distance table on this rather than on the name, so
/// two references to `a` in different scopes resolve independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ExprId(pub usize);

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A **literal constant** that appears directly in the source code.
///
/// The parser copies the value out of the token so the AST does not depend
/// on the token buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal stored as IEEE‑754 `f64`.
    /// Integral lexemes such as `"3"` are still parsed as `3.0`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// Every kind of *expression* in Lox.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Prefix unary operator expression
    /// *Example:* `!isReady` or `-42`
    Unary {
        /// The operator token (`!` or `-`).
        operator: Token,
        right: Box<Expr>,
    },

    /// Infix arithmetic, comparison or equality expression
    /// *Example:* `a + b`, `x <= y`
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Variable access.
    Variable { id: ExprId, name: Token },

    /// Assignment expression: `identifier "=" expression`
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Short‑circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token, // `AND` or `OR`
        right: Box<Expr>,
    },

    /// Function call expression
    /// *Example:* `clock()` or `add(1, 2)`
    Call {
        callee: Box<Expr>,
        /// The closing `)` token, retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },
}

/// A function declaration. Shared between the AST and every function value
/// created from it, so closures never copy the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<Token>,

    pub body: Vec<Stmt>,
}

/// *Statements*: complete executable constructs. A program is a sequence of
/// these returned by [`Parser::parse`](crate::parser::Parser::parse).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop. `for` loops are desugared into this at parse time.
    While { condition: Expr, body: Box<Stmt> },

    Function(Rc<FunctionDecl>),

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for diagnostics).
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },
}
