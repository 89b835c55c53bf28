//! Diagnostics for every phase of a run.
//!
//! Static phases (scanner, parser, resolver) collect [`LoxError`]s; execution
//! stops at the first [`RuntimeError`]. Both render as the standard
//! diagnostic line:
//!
//! ```text
//! [line N] Error<location>: <message>
//! ```
//!
//! where `<location>` is empty for scan-time errors, `" at end"` when the
//! offending token is end-of-input, and `" at '<lexeme>'"` otherwise.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::debug;

use crate::token::Token;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Bad character or unterminated string. Carries no location.
    #[error("[line {line}] Error: {message}")]
    Lex {
        message: String,
        line: usize,
    },

    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Static‑analysis failure (variable read in its own initializer).
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },
}

impl LoxError {
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse {
            message,
            location: token.location(),
            line: token.line,
        }
    }

    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Resolve error: line={}, msg={}", token.line, message);

        LoxError::Resolve {
            message,
            location: token.location(),
            line: token.line,
        }
    }
}

/// Error raised while evaluating a program. Terminates the current run.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Type mismatch, undefined variable, bad call, call-depth overflow.
    #[error("[line {line}] Error{location}: {message}")]
    Evaluation {
        message: String,
        location: String,
        line: usize,
    },

    /// The `print` sink rejected a write.
    #[error("failed to write program output: {0}")]
    Output(#[from] io::Error),
}

impl RuntimeError {
    pub fn new<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Runtime error: line={}, msg={}", token.line, message);

        RuntimeError::Evaluation {
            message,
            location: token.location(),
            line: token.line,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoxError>;
