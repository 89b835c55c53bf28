//! Scope frames. Each frame owns its bindings and points at its enclosing
//! frame; frames are shared (`Rc<RefCell<_>>`) so closures see later writes.

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a frame, as held by the interpreter and by closures.
pub type SharedEnv = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<SharedEnv>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: SharedEnv) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn into_shared(self) -> SharedEnv {
        Rc::new(RefCell::new(self))
    }

    /// Whether this frame itself (not its ancestors) binds `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Always succeeds; redefining a name in the same frame overwrites it.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up innermost-first along the whole chain.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Overwrite an existing binding. Never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Read `name` from the frame exactly `distance` hops up from `env`.
    ///
    /// The resolver has already proven the binding exists there, so no walk
    /// past that frame happens; `None` means the resolver and the runtime
    /// disagree about scope nesting.
    pub fn get_at(env: &SharedEnv, distance: usize, name: &str) -> Option<Value> {
        let frame = Self::ancestor(env, distance)?;
        let value = frame.borrow().values.get(name).cloned();
        value
    }

    /// Write `name` in the frame exactly `distance` hops up from `env`.
    pub fn assign_at(env: &SharedEnv, distance: usize, name: &str, value: Value) -> bool {
        match Self::ancestor(env, distance) {
            Some(frame) => {
                frame.borrow_mut().values.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    fn ancestor(env: &SharedEnv, distance: usize) -> Option<SharedEnv> {
        let mut frame: SharedEnv = Rc::clone(env);

        for _ in 0..distance {
            let parent = frame.borrow().enclosing.clone()?;
            frame = parent;
        }

        debug!("Walked {} frame(s) up the chain", distance);

        Some(frame)
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))
}
