//! Callable values: host-provided natives and user-defined closures.

use std::fmt;
use std::io::Write;
use std::rc::Rc;

use chrono::Utc;
use log::debug;

use crate::ast::FunctionDecl;
use crate::environment::{Environment, SharedEnv};
use crate::error::RuntimeError;
use crate::interpreter::{Exec, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// Signature of a host function. The `String` error becomes a runtime error
/// located at the call's closing parenthesis.
pub type NativeFn = fn(&[Value]) -> Result<Value, String>;

pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

/// A function declaration paired with the frame that was active when the
/// declaration executed. The frame is shared, never copied.
pub struct LoxFunction {
    pub declaration: Rc<FunctionDecl>,
    pub closure: SharedEnv,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: SharedEnv) -> Self {
        Self {
            declaration,
            closure,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    /// Run the body in a fresh frame chained to the *captured* frame.
    fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let mut frame = Environment::with_enclosing(Rc::clone(&self.closure));

        for (param, arg) in self.declaration.params.iter().zip(arguments) {
            debug!("Binding parameter '{}' to {}", param.lexeme, arg);
            frame.define(&param.lexeme, arg);
        }

        match interpreter.execute_block(&self.declaration.body, frame.into_shared())? {
            Exec::Return(value) => Ok(value),
            Exec::Normal => Ok(Value::Nil),
        }
    }
}

/// Anything a call expression can invoke.
#[derive(Clone)]
pub enum Callable {
    Native(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::Function(function) => function.declaration.params.len(),
        }
    }

    /// Invoke with exactly [`arity`](Callable::arity) already-evaluated arguments.
    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value, RuntimeError> {
        match self {
            Callable::Native(native) => {
                debug!("Calling native function '{}'", native.name);
                (native.func)(&arguments).map_err(|msg| RuntimeError::new(paren, msg))
            }
            Callable::Function(function) => {
                debug!("Calling user-defined function '{}'", function.name());
                function.call(interpreter, arguments)
            }
        }
    }

    /// Identity comparison: two values are the same callable only if they
    /// are the same function object.
    pub fn same_as(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(_) => write!(f, "<native fn>"),
            Callable::Function(function) => write!(f, "<fn {}>", function.name()),
        }
    }
}

// The closure frame may (indirectly) hold this very function, so Debug must
// not descend into it.
impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(native) => write!(f, "<native fn {}>", native.name),
            Callable::Function(function) => write!(f, "<fn {}>", function.name()),
        }
    }
}

/// Host functions installed in every fresh global frame.
pub fn natives() -> Vec<NativeFunction> {
    vec![NativeFunction {
        name: "clock",
        arity: 0,
        func: clock,
    }]
}

/// Seconds since the Unix epoch, with millisecond resolution.
fn clock(_args: &[Value]) -> Result<Value, String> {
    let millis: i64 = Utc::now().timestamp_millis();

    Ok(Value::Number(millis as f64 / 1000.0))
}
