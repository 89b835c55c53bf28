use log::debug;
use serde::Serialize;
use std::fmt;
use std::mem;

/// Lexical category of a [`Token`].
///
/// Literal kinds carry their decoded value; every other kind is fully
/// described by the lexeme. `CLASS`, `SUPER` and `THIS` are reserved words
/// the parser rejects.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Serialize)]
pub enum TokenType {
    // Punctuation.
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACE,
    RIGHT_BRACE,
    COMMA,
    DOT,
    MINUS,
    PLUS,
    SEMICOLON,
    SLASH,
    STAR,

    // Operators that may take a trailing `=`.
    BANG,
    BANG_EQUAL,
    EQUAL,
    EQUAL_EQUAL,
    GREATER,
    GREATER_EQUAL,
    LESS,
    LESS_EQUAL,

    // Literals.
    IDENTIFIER,
    /// Contents between the quotes.
    STRING(String),
    NUMBER(f64),

    // Keywords.
    AND,
    CLASS,
    ELSE,
    FALSE,
    FUN,
    FOR,
    IF,
    NIL,
    OR,
    PRINT,
    RETURN,
    SUPER,
    THIS,
    TRUE,
    VAR,
    WHILE,

    EOF,
}

impl TokenType {
    /// Variant name without payload, as printed by the `--tokens` dump.
    pub fn name(&self) -> &'static str {
        use TokenType::*;

        match self {
            LEFT_PAREN => "LEFT_PAREN",
            RIGHT_PAREN => "RIGHT_PAREN",
            LEFT_BRACE => "LEFT_BRACE",
            RIGHT_BRACE => "RIGHT_BRACE",
            COMMA => "COMMA",
            DOT => "DOT",
            MINUS => "MINUS",
            PLUS => "PLUS",
            SEMICOLON => "SEMICOLON",
            SLASH => "SLASH",
            STAR => "STAR",
            BANG => "BANG",
            BANG_EQUAL => "BANG_EQUAL",
            EQUAL => "EQUAL",
            EQUAL_EQUAL => "EQUAL_EQUAL",
            GREATER => "GREATER",
            GREATER_EQUAL => "GREATER_EQUAL",
            LESS => "LESS",
            LESS_EQUAL => "LESS_EQUAL",
            IDENTIFIER => "IDENTIFIER",
            STRING(_) => "STRING",
            NUMBER(_) => "NUMBER",
            AND => "AND",
            CLASS => "CLASS",
            ELSE => "ELSE",
            FALSE => "FALSE",
            FUN => "FUN",
            FOR => "FOR",
            IF => "IF",
            NIL => "NIL",
            OR => "OR",
            PRINT => "PRINT",
            RETURN => "RETURN",
            SUPER => "SUPER",
            THIS => "THIS",
            TRUE => "TRUE",
            VAR => "VAR",
            WHILE => "WHILE",
            EOF => "EOF",
        }
    }
}

/// Kinds compare by variant only; `NUMBER(1.0) == NUMBER(2.0)`. The parser
/// relies on this to ask "is the next token a number?".
impl PartialEq for TokenType {
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

/// One lexeme plus where it came from.
///
/// The lexeme is owned: function declarations captured by closures keep their
/// tokens alive after the source line that produced them is gone (REPL mode).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    /// 1-based.
    pub line: usize,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: impl Into<String>, line: usize) -> Self {
        let lexeme: String = lexeme.into();

        debug!("New token {:?} '{}' on line {}", token_type, lexeme, line);

        Self {
            token_type,
            lexeme,
            line,
        }
    }

    /// Location fragment used in diagnostics: `" at end"` for EOF,
    /// `" at '<lexeme>'"` otherwise.
    pub fn location(&self) -> String {
        if self.token_type == TokenType::EOF {
            " at end".to_string()
        } else {
            format!(" at '{}'", self.lexeme)
        }
    }
}

/// `KIND lexeme literal`, e.g. `NUMBER 3 3.0` or `IDENTIFIER x null`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.token_type.name(), self.lexeme)?;

        match &self.token_type {
            TokenType::STRING(s) => f.write_str(s),
            TokenType::NUMBER(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                let mut buf = itoa::Buffer::new();
                write!(f, "{}.0", buf.format(*n as i64))
            }
            TokenType::NUMBER(n) => write!(f, "{}", n),
            _ => f.write_str("null"),
        }
    }
}
