//! Tree-walking evaluator.
//!
//! Statements execute for effect and report how they finished through
//! [`Exec`]; a `return` travels outward as `Exec::Return` until the function
//! call that owns it consumes it. Runtime errors travel separately as
//! `Err(RuntimeError)` and abort the current run.

use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, LiteralValue, Stmt};
use crate::config::Config;
use crate::environment::{Environment, SharedEnv};
use crate::error::RuntimeError;
use crate::function::{natives, Callable, LoxFunction};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Free stack below which a new segment is allocated before recursing.
const RED_ZONE: usize = 100 * 1024;

/// Size of each segment allocated once the red zone is reached.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f` on a heap-allocated stack segment if the current one is nearly
/// spent. Statement and expression nesting inside Lox calls grows the host
/// stack faster than the call-depth limit alone can bound.
#[inline]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// Convenient alias for interpreter results.
pub type IResult<T> = Result<T, RuntimeError>;

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Exec {
    Normal,
    Return(Value),
}

pub struct Interpreter<W: Write> {
    globals: SharedEnv,
    environment: SharedEnv,
    /// Resolved hop counts for local variable and assignment nodes.
    /// Missing ⇒ look the name up in `globals`.
    locals: HashMap<ExprId, usize>,
    output: W,
    config: Config,
    depth: usize,
}

impl<W: Write> Interpreter<W> {
    /// Creates a new Interpreter printing to `output`, with natives such as
    /// `clock` defined in the global frame.
    pub fn new(output: W) -> Self {
        Self::with_config(output, Config::default())
    }

    pub fn with_config(output: W, config: Config) -> Self {
        info!("Initializing Interpreter with {:?}", config);

        let globals: SharedEnv = Environment::new().into_shared();

        for native in natives() {
            debug!("Defining native function '{}'", native.name);
            let name = native.name;
            globals
                .borrow_mut()
                .define(name, Value::Callable(Callable::Native(Rc::new(native))));
        }

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
            config,
            depth: 0,
        }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn globals(&self) -> &SharedEnv {
        &self.globals
    }

    /// Record that the node `id` binds `depth` frames up from where it runs.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        debug!("Noting local {} at depth {}", id, depth);
        self.locals.insert(id, depth);
    }

    /// The hop count recorded for `id`, or `None` for a global.
    pub fn local_depth(&self, id: ExprId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    /// Interprets a list of statements (a "program"). Stops at the first
    /// runtime error; a top-level `return` ends the run quietly.
    pub fn interpret(&mut self, statements: &[Stmt]) -> IResult<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            if let Exec::Return(value) = self.execute(stmt)? {
                info!("Top-level return with {}; stopping run", value);
                break;
            }
        }

        self.output.flush()?;

        info!("Interpretation completed successfully");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    pub fn execute(&mut self, stmt: &Stmt) -> IResult<Exec> {
        ensure_sufficient_stack(|| self.execute_stmt(stmt))
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> IResult<Exec> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Exec::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Exec::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Exec::Normal)
            }

            Stmt::Block(statements) => {
                let frame = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, frame.into_shared())
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Exec::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Exec::Return(value) = self.execute(body)? {
                        return Ok(Exec::Return(value));
                    }
                }
                Ok(Exec::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);
                let function =
                    LoxFunction::new(Rc::clone(declaration), Rc::clone(&self.environment));
                self.environment.borrow_mut().define(
                    &declaration.name.lexeme,
                    Value::Callable(Callable::Function(Rc::new(function))),
                );
                Ok(Exec::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", value);
                Ok(Exec::Return(value))
            }
        }
    }

    /// Run `statements` with `frame` as the active environment. The previous
    /// environment is restored on every exit path.
    pub fn execute_block(&mut self, statements: &[Stmt], frame: SharedEnv) -> IResult<Exec> {
        let previous = std::mem::replace(&mut self.environment, frame);
        let result = self.execute_all(statements);
        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> IResult<Exec> {
        for stmt in statements {
            if let Exec::Return(value) = self.execute(stmt)? {
                return Ok(Exec::Return(value));
            }
        }
        Ok(Exec::Normal)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        ensure_sufficient_stack(|| self.evaluate_expr(expr))
    }

    fn evaluate_expr(&mut self, expr: &Expr) -> IResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.token_type {
                    TokenType::MINUS => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::new(operator, "Operand must be a number.")),
                    },
                    TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
                    _ => Err(RuntimeError::new(operator, "Invalid unary operator.")),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuit = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        let env = &self.environment;
                        if !Environment::assign_at(env, distance, &name.lexeme, value.clone()) {
                            return Err(undefined(name));
                        }
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.invoke(callee, paren, args)
            }
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> IResult<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, &name.lexeme)
                .ok_or_else(|| undefined(name)),
            None => self.globals.borrow().get(name),
        }
    }

    /// Check the callee and arity, then call with bounded depth.
    fn invoke(&mut self, callee: Value, paren: &Token, args: Vec<Value>) -> IResult<Value> {
        let Value::Callable(callable) = callee else {
            return Err(RuntimeError::new(paren, "Can only call functions."));
        };

        if args.len() != callable.arity() {
            return Err(RuntimeError::new(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    args.len()
                ),
            ));
        }

        if self.depth >= self.config.max_call_depth {
            return Err(RuntimeError::new(paren, "Stack overflow."));
        }

        self.depth += 1;
        let result = callable.call(self, args, paren);
        self.depth -= 1;

        debug!("Call to {} finished: {:?}", callable, result);

        result
    }
}

fn binary(operator: &Token, left: Value, right: Value) -> IResult<Value> {
    use Value::{Bool, Number};

    match (&operator.token_type, left, right) {
        (TokenType::EQUAL_EQUAL, l, r) => Ok(Bool(l == r)),
        (TokenType::BANG_EQUAL, l, r) => Ok(Bool(l != r)),

        (TokenType::PLUS, Number(a), Number(b)) => Ok(Number(a + b)),
        (TokenType::PLUS, Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
        (TokenType::PLUS, _, _) => Err(RuntimeError::new(
            operator,
            "Operands must be two numbers or two strings.",
        )),

        (TokenType::MINUS, Number(a), Number(b)) => Ok(Number(a - b)),
        (TokenType::STAR, Number(a), Number(b)) => Ok(Number(a * b)),
        (TokenType::SLASH, Number(a), Number(b)) => Ok(Number(a / b)),
        (TokenType::GREATER, Number(a), Number(b)) => Ok(Bool(a > b)),
        (TokenType::GREATER_EQUAL, Number(a), Number(b)) => Ok(Bool(a >= b)),
        (TokenType::LESS, Number(a), Number(b)) => Ok(Bool(a < b)),
        (TokenType::LESS_EQUAL, Number(a), Number(b)) => Ok(Bool(a <= b)),

        (
            TokenType::MINUS
            | TokenType::STAR
            | TokenType::SLASH
            | TokenType::GREATER
            | TokenType::GREATER_EQUAL
            | TokenType::LESS
            | TokenType::LESS_EQUAL,
            _,
            _,
        ) => Err(RuntimeError::new(operator, "Operands must be numbers.")),

        _ => Err(RuntimeError::new(operator, "Invalid binary operator.")),
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))
}
