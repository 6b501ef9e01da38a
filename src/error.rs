//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! Every stage (scanner, parser, resolver, runtime, CLI) converts its failure
//! modes into one of the variants defined here, which gives the crate a single
//! `Result<T>` alias and lets the binary hand errors to `anyhow` unchanged.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::Token;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        /// ` at 'lexeme'` or ` at end`, empty when unknown.
        location: String,
        line: usize,
    },

    /// Static‑analysis failure (e.g. redeclaration, misplaced `return`).
    #[error("[line {line}] Error at '{lexeme}': {message}")]
    Resolve {
        message: String,
        lexeme: String,
        line: usize,
    },

    /// Runtime evaluation error that reached the top level.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        let location: String = match token.token_type {
            crate::token::TokenType::EOF => " at end".to_string(),
            _ => format!(" at '{}'", token.lexeme),
        };

        LoxError::Parse {
            message,
            location,
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        LoxError::Resolve {
            message,
            lexeme: token.lexeme.clone(),
            line: token.line,
        }
    }

    /// Process exit code the CLI uses for this error (sysexits style).
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Lex { .. } | LoxError::Parse { .. } | LoxError::Resolve { .. } => 65,
            LoxError::Runtime(_) => 70,
            LoxError::Io(_) | LoxError::Utf8(_) => 74,
        }
    }
}

/// Errors raised while executing a program.  Each kind carries the offending
/// lexeme (identifier, operator or property name) and its source line.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'.\n[line {line}]")]
    UndefinedVariable { name: String, line: usize },

    #[error("{message}\n[line {line}]")]
    TypeError {
        message: String,
        lexeme: String,
        line: usize,
    },

    #[error("Expected {expected} arguments but got {got}.\n[line {line}]")]
    ArityMismatch {
        expected: usize,
        got: usize,
        /// The call's closing `)`.
        lexeme: String,
        line: usize,
    },

    #[error("Undefined property '{name}'.\n[line {line}]")]
    UndefinedProperty { name: String, line: usize },

    #[error("Division by zero.\n[line {line}]")]
    DivisionByZero { lexeme: String, line: usize },
}

impl RuntimeError {
    pub fn undefined_variable(name: &Token) -> Self {
        RuntimeError::UndefinedVariable {
            name: name.lexeme.clone(),
            line: name.line,
        }
    }

    pub fn type_error<S: Into<String>>(token: &Token, msg: S) -> Self {
        RuntimeError::TypeError {
            message: msg.into(),
            lexeme: token.lexeme.clone(),
            line: token.line,
        }
    }

    pub fn arity_mismatch(paren: &Token, expected: usize, got: usize) -> Self {
        RuntimeError::ArityMismatch {
            expected,
            got,
            lexeme: paren.lexeme.clone(),
            line: paren.line,
        }
    }

    pub fn division_by_zero(operator: &Token) -> Self {
        RuntimeError::DivisionByZero {
            lexeme: operator.lexeme.clone(),
            line: operator.line,
        }
    }

    pub fn undefined_property(name: &Token) -> Self {
        RuntimeError::UndefinedProperty {
            name: name.lexeme.clone(),
            line: name.line,
        }
    }

    /// Source line the error is reported against.
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::TypeError { line, .. }
            | RuntimeError::ArityMismatch { line, .. }
            | RuntimeError::UndefinedProperty { line, .. }
            | RuntimeError::DivisionByZero { line, .. } => *line,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
