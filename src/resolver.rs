//! Static scope analysis, run between parsing and execution.
//!
//! The walk mirrors the frames the interpreter will create: one per block and
//! one per function call (parameters and body share it). For every variable
//! read or assignment it tells the interpreter how many frames up the binding
//! lives; names found in no enclosing scope are left for the global frame.
//!
//! The only static error is reading a local inside its own initializer
//! (`{ var a = a; }`) when nothing outside that declaration binds the name.
//! A shadowing initializer such as `var a = 1; { var a = a; }` reads the
//! outer `a`. Diagnostics are collected and the walk always covers the whole
//! program.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::token::Token;

/// Records binding distances by calling back into the interpreter.
pub struct Resolver<'a, 'interp, W: Write> {
    interpreter: &'interp mut Interpreter<W>,
    /// Innermost last. `false` while a declaration's initializer is resolved.
    scopes: Vec<HashMap<&'a str, bool>>,
    /// Top-level names declared so far in this program.
    globals: HashSet<&'a str>,
    errors: Vec<LoxError>,
}

impl<'a, 'interp, W: Write> Resolver<'a, 'interp, W> {
    pub fn new(interpreter: &'interp mut Interpreter<W>) -> Self {
        info!("Resolver created");
        Resolver {
            interpreter,
            scopes: Vec::new(),
            globals: HashSet::new(),
            errors: Vec::new(),
        }
    }

    /// Resolve a whole program, recording distances in the interpreter.
    pub fn resolve(&mut self, statements: &'a [Stmt]) {
        info!("Resolving {} top-level statement(s)", statements.len());

        self.resolve_stmts(statements);
    }

    pub fn errors(&self) -> &[LoxError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<LoxError> {
        std::mem::take(&mut self.errors)
    }

    fn resolve_stmts(&mut self, statements: &'a [Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_stmts(statements);
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }

            Stmt::Function(declaration) => {
                // Defined before the body is resolved so it can recurse.
                self.declare(&declaration.name);
                self.define(&declaration.name);
                self.resolve_function(declaration);
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { value, .. } => {
                if let Some(expr) = value {
                    self.resolve_expr(expr);
                }
            }
        }
    }

    fn resolve_expr(&mut self, expr: &'a Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                let in_own_initializer = self
                    .scopes
                    .last()
                    .is_some_and(|scope| scope.get(name.lexeme.as_str()) == Some(&false));

                if in_own_initializer && !self.bound_outside_innermost(name) {
                    self.errors.push(LoxError::resolve(
                        name,
                        "Can't read local variable in its own initializer.",
                    ));
                }

                self.resolve_local(*id, name, true);
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name, false);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }
        }
    }

    /// Parameters and body share one scope, matching the single frame a call
    /// creates.
    fn resolve_function(&mut self, declaration: &'a FunctionDecl) {
        self.begin_scope();
        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&declaration.body);
        self.end_scope();
    }

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Redeclaring in the same scope is allowed and simply re-marks the name.
    fn declare(&mut self, name: &'a Token) {
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name.lexeme.as_str(), false);
            }
            None => {
                self.globals.insert(name.lexeme.as_str());
            }
        }
    }

    fn define(&mut self, name: &'a Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.as_str(), true);
        }
    }

    /// Whether `name` has a binding other than the innermost, still
    /// uninitialized declaration: an enclosing local, a top-level declaration
    /// seen earlier, or a global already living in the interpreter.
    fn bound_outside_innermost(&self, name: &Token) -> bool {
        let lexeme = name.lexeme.as_str();
        let outer = self.scopes.len().saturating_sub(1);

        self.scopes[..outer]
            .iter()
            .any(|scope| scope.contains_key(lexeme))
            || self.globals.contains(lexeme)
            || self.interpreter.globals().borrow().contains(lexeme)
    }

    /// Record this occurrence as a local at depth `d`, or leave it as a
    /// global if no enclosing scope declares it.
    ///
    /// A read skips declarations whose own initializer is still being
    /// resolved. An assignment targets the nearest declaration either way, so
    /// `var a = a = 2;` writes the new `a`.
    fn resolve_local(&mut self, id: ExprId, name: &Token, skip_uninitialized: bool) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            let bound = match scope.get(name.lexeme.as_str()) {
                Some(&defined) => defined || !skip_uninitialized,
                None => false,
            };
            if bound {
                debug!("Resolved '{}' {} at depth {}", name.lexeme, id, depth);
                self.interpreter.resolve(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' {} as global", name.lexeme, id);
    }
}
