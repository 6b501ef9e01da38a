//! Module `scanner` implements a one‑pass, streaming lexer for the Lox language.
//!
//! It turns a byte slice (`&[u8]`) into a sequence of owned [`Token`]s,
//! skipping whitespace and comments and emitting exactly one `EOF` token at the
//! end. The scanner is a `FusedIterator`, so it chains safely with other
//! iterator adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &[u8]) -> Scanner<'_>` creates a lexer over the buffer.
//! - `impl Iterator for Scanner` yields `Result<Token, LoxError>`; an `Err`
//!   reports a lexing error and scanning resumes with the next byte.
//! - `Scanner::scan_all` collects every token, returning the first error only
//!   after the whole input has been seen.
//!
//! # Notes
//!
//! - `//` comments are skipped in bulk with `memchr`.
//! - Keywords are resolved through a compile‑time perfect hash (`phf`).
//! - Strings may span lines; an unterminated string is a lex error.

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

/// Streaming lexer over a source buffer.
pub struct Scanner<'a> {
    src: &'a [u8],
    start: usize, // first byte of the current lexeme
    curr: usize,  // one past the last byte examined
    line: usize,
    done: bool,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(src: &'a [u8]) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            done: false,
        }
    }

    /// Scan the entire input.  Every error is logged; the first one is
    /// returned once the input is exhausted.
    pub fn scan_all(self) -> Result<Vec<Token>> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut first_error: Option<LoxError> = None;

        for result in self {
            match result {
                Ok(token) => tokens.push(token),
                Err(e) => {
                    debug!("Lex error: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(tokens),
        }
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Current byte, or `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        self.src.get(self.curr).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.src.get(self.curr + 1).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == expected && !self.is_at_end() {
            self.curr += 1;
            true
        } else {
            false
        }
    }

    fn lexeme(&self) -> String {
        String::from_utf8_lossy(&self.src[self.start..self.curr]).into_owned()
    }

    fn either(&mut self, second: u8, matched: TokenType, single: TokenType) -> TokenType {
        if self.match_byte(second) {
            matched
        } else {
            single
        }
    }

    /// Scan one lexeme starting at `self.start`.  Whitespace and comments
    /// yield `Ok(None)`.
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let b = self.advance();

        let tt = match b {
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

            b'!' => self.either(b'=', TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.either(b'=', TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.either(b'=', TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.either(b'=', TokenType::GREATER_EQUAL, TokenType::GREATER),

            b' ' | b'\r' | b'\t' => return Ok(None),

            b'\n' => {
                self.line += 1;
                return Ok(None);
            }

            b'/' => {
                if self.match_byte(b'/') {
                    self.curr = match memchr(b'\n', &self.src[self.curr..]) {
                        Some(pos) => self.curr + pos,
                        None => self.src.len(),
                    };
                    return Ok(None);
                }

                TokenType::SLASH
            }

            b'"' => self.string()?,

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", b as char),
                ));
            }
        };

        Ok(Some(tt))
    }

    fn string(&mut self) -> Result<TokenType> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.advance(); // closing quote

        let body = &self.src[self.start + 1..self.curr - 1];

        Ok(TokenType::STRING(
            String::from_utf8_lossy(body).into_owned(),
        ))
    }

    fn number(&mut self) -> TokenType {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        // Only ASCII digits and at most one '.' were consumed.
        let n: f64 = self.lexeme().parse().unwrap_or_default();

        TokenType::NUMBER(n)
    }

    fn identifier(&mut self) -> TokenType {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }

        KEYWORDS
            .get(&self.src[self.start..self.curr])
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while !self.is_at_end() {
            self.start = self.curr;

            match self.scan_token() {
                Ok(Some(tt)) => {
                    debug!("Scanned token ({:?}) on line {}", tt, self.line);

                    return Some(Ok(Token::new(tt, self.lexeme(), self.line)));
                }
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }

        self.done = true;

        Some(Ok(Token::new(TokenType::EOF, "", self.line)))
    }
}

impl FusedIterator for Scanner<'_> {}
