//! Streaming lexer.
//!
//! [`Scanner`] walks the source once, byte by byte, and yields
//! `Result<Token, LoxError>` items. A lexical error does not stop the walk:
//! the offending input is skipped and the next item is the token after it.
//! The stream always ends with exactly one `EOF` token, after which the
//! iterator is fused.
//!
//! Recognized input:
//!
//! - punctuation `( ) { } , . - + ; * /` and the operators `! != = == < <= > >=`;
//! - string literals between double quotes, which may span lines;
//! - number literals, digits with an optional fractional part (`4.` is `4` then `.`);
//! - identifiers `[A-Za-z_][A-Za-z0-9_]*`, promoted to keywords through a
//!   compile-time `phf` map;
//! - `//` comments, skipped to the end of the line with `memchr`.
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! let (tokens, errors) = Scanner::new("print 123; // example").scan_all();
//! assert_eq!(tokens.len(), 4);
//! assert!(errors.is_empty());
//! ```

use std::iter::FusedIterator;

use log::{debug, info};
use memchr::memchr;
use phf::phf_map;

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and" => TokenType::AND,
    "class" => TokenType::CLASS,
    "else" => TokenType::ELSE,
    "false" => TokenType::FALSE,
    "for" => TokenType::FOR,
    "fun" => TokenType::FUN,
    "if" => TokenType::IF,
    "nil" => TokenType::NIL,
    "or" => TokenType::OR,
    "print" => TokenType::PRINT,
    "return" => TokenType::RETURN,
    "super" => TokenType::SUPER,
    "this" => TokenType::THIS,
    "true" => TokenType::TRUE,
    "var" => TokenType::VAR,
    "while" => TokenType::WHILE,
};

pub struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    /// First byte of the lexeme being scanned.
    start: usize,
    /// Next byte to look at.
    pos: usize,
    line: usize,
    finished: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            bytes: src.as_bytes(),
            start: 0,
            pos: 0,
            line: 1,
            finished: false,
        }
    }

    /// Drain the scanner, returning every token (always ending in `EOF`)
    /// alongside every lexical diagnostic encountered on the way.
    pub fn scan_all(self) -> (Vec<Token>, Vec<LoxError>) {
        let mut tokens: Vec<Token> = Vec::new();
        let mut errors: Vec<LoxError> = Vec::new();

        for item in self {
            match item {
                Ok(token) => tokens.push(token),
                Err(e) => errors.push(e),
            }
        }

        info!(
            "Scanned {} token(s) with {} error(s)",
            tokens.len(),
            errors.len()
        );

        (tokens, errors)
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    #[inline]
    fn bump(&mut self) -> u8 {
        let b = self.bytes[self.pos];
        self.pos += 1;
        b
    }

    /// The next byte, or `0` once input is exhausted.
    #[inline]
    fn current(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    #[inline]
    fn lookahead(&self) -> u8 {
        self.bytes.get(self.pos + 1).copied().unwrap_or(0)
    }

    /// `long` if the next byte is `=` (consuming it), `short` otherwise.
    #[inline]
    fn either(&mut self, short: TokenType, long: TokenType) -> TokenType {
        if self.current() == b'=' {
            self.pos += 1;
            long
        } else {
            short
        }
    }

    /// Scan one lexeme starting at `self.start`. `Ok(None)` means the lexeme
    /// was trivia (whitespace, newline or comment).
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let kind = match self.bump() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.either(TokenType::BANG, TokenType::BANG_EQUAL),
            b'=' => self.either(TokenType::EQUAL, TokenType::EQUAL_EQUAL),
            b'<' => self.either(TokenType::LESS, TokenType::LESS_EQUAL),
            b'>' => self.either(TokenType::GREATER, TokenType::GREATER_EQUAL),

            b'/' if self.current() == b'/' => {
                // The newline stays unread so the line count sees it.
                self.pos = match memchr(b'\n', &self.bytes[self.pos..]) {
                    Some(offset) => self.pos + offset,
                    None => self.bytes.len(),
                };
                return Ok(None);
            }
            b'/' => TokenType::SLASH,

            b'\n' => {
                self.line += 1;
                return Ok(None);
            }
            b' ' | b'\r' | b'\t' => return Ok(None),

            b'"' => self.string()?,
            b'0'..=b'9' => self.number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                // Step over the whole character, not just its first byte.
                while !self.src.is_char_boundary(self.pos) {
                    self.pos += 1;
                }
                return Err(LoxError::lex(self.line, "Unexpected character."));
            }
        };

        Ok(Some(kind))
    }

    fn string(&mut self) -> Result<TokenType> {
        while !self.at_end() && self.current() != b'"' {
            if self.bump() == b'\n' {
                self.line += 1;
            }
        }

        if self.at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }
        self.pos += 1;

        let contents = &self.src[self.start + 1..self.pos - 1];
        Ok(TokenType::STRING(contents.to_owned()))
    }

    fn number(&mut self) -> TokenType {
        self.skip_digits();
        if self.current() == b'.' && self.lookahead().is_ascii_digit() {
            self.pos += 1;
            self.skip_digits();
        }

        // The lexeme is digits with at most one interior dot, so this parses.
        let value = self.src[self.start..self.pos].parse::<f64>().unwrap_or(0.0);
        TokenType::NUMBER(value)
    }

    fn skip_digits(&mut self) {
        while self.current().is_ascii_digit() {
            self.pos += 1;
        }
    }

    fn identifier(&mut self) -> TokenType {
        while matches!(self.current(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.pos += 1;
        }

        let text = &self.src[self.start..self.pos];
        KEYWORDS.get(text).cloned().unwrap_or(TokenType::IDENTIFIER)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while !self.at_end() {
            self.start = self.pos;

            match self.scan_token() {
                Ok(Some(kind)) => {
                    let lexeme = &self.src[self.start..self.pos];
                    debug!("Scanned {:?} on line {}", kind, self.line);
                    return Some(Ok(Token::new(kind, lexeme, self.line)));
                }
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }

        self.finished = true;
        Some(Ok(Token::new(TokenType::EOF, "", self.line)))
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
