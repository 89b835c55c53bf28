pub mod ast;
pub mod ast_printer;
pub mod config;
pub mod environment;
pub mod error;
pub mod function;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod token;
pub mod value;

pub use config::Config;
pub use error::{LoxError, Result, RuntimeError};
pub use session::{Report, Session};
