//! The scan → parse → resolve → interpret pipeline, packaged so a driver can
//! run one file or many REPL lines against the same global state.

use std::io::Write;

use log::{debug, info};

use crate::config::Config;
use crate::error::{LoxError, RuntimeError};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;

/// Exit code for command-line usage errors.
pub const EXIT_USAGE: i32 = 64;

/// Exit code when any syntax or static error was found.
pub const EXIT_DATA_ERR: i32 = 65;

/// Exit code when execution hit a runtime error.
pub const EXIT_SOFTWARE: i32 = 70;

/// Outcome of one [`Session::run`].
#[derive(Debug, Default)]
pub struct Report {
    /// Lex, syntax and resolution diagnostics, in the order they were found.
    pub diagnostics: Vec<LoxError>,

    /// The error that aborted execution, if any.
    pub runtime_error: Option<RuntimeError>,
}

impl Report {
    pub fn had_static_error(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.runtime_error.is_some()
    }

    /// 65 for static errors, 70 for runtime errors, 0 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.had_static_error() {
            EXIT_DATA_ERR
        } else if self.had_runtime_error() {
            EXIT_SOFTWARE
        } else {
            0
        }
    }

    /// Every diagnostic line, runtime error last.
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .map(ToString::to_string)
            .chain(self.runtime_error.iter().map(ToString::to_string))
            .collect()
    }
}

/// A persistent interpreter plus the node-identity counter shared by every
/// program it runs.
pub struct Session<W: Write> {
    interpreter: Interpreter<W>,
    next_id: usize,
}

impl<W: Write> Session<W> {
    pub fn new(output: W) -> Self {
        Self::with_config(output, Config::default())
    }

    pub fn with_config(output: W, config: Config) -> Self {
        Self {
            interpreter: Interpreter::with_config(output, config),
            next_id: 0,
        }
    }

    pub fn interpreter(&self) -> &Interpreter<W> {
        &self.interpreter
    }

    pub fn output(&self) -> &W {
        self.interpreter.output()
    }

    pub fn into_output(self) -> W {
        self.interpreter.into_output()
    }

    /// Run `source` as one program. Nothing executes if any lex, syntax or
    /// static diagnostic was recorded.
    pub fn run(&mut self, source: &str) -> Report {
        info!("Running {} byte(s) of source", source.len());

        let mut report = Report::default();

        let (tokens, lex_errors) = Scanner::new(source).scan_all();
        report.diagnostics.extend(lex_errors);

        let mut parser = Parser::with_first_id(tokens, self.next_id);
        let statements = parser.parse();
        self.next_id = parser.next_id();
        report.diagnostics.extend(parser.take_errors());

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);
        report.diagnostics.extend(resolver.take_errors());

        if report.had_static_error() {
            debug!(
                "Skipping execution: {} diagnostic(s)",
                report.diagnostics.len()
            );
            return report;
        }

        if let Err(e) = self.interpreter.interpret(&statements) {
            debug!("Runtime error: {}", e);
            report.runtime_error = Some(e);
        }

        report
    }
}
