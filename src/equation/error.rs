//! Error types for the equation compiler.

use std::fmt;

use serde::Serialize;

/// An error that stopped a compile attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileError {
    pub message: String,
    /// Zero-based character offset into the source.
    pub position: usize,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Lex,
    Parse,
    UnknownIdentifier,
}

impl CompileError {
    pub fn lex(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
            kind: ErrorKind::Lex,
        }
    }

    pub fn parse(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
            kind: ErrorKind::Parse,
        }
    }

    pub fn unknown_identifier(name: &str, position: usize) -> Self {
        Self {
            message: format!("unknown identifier '{name}'"),
            position,
            kind: ErrorKind::UnknownIdentifier,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[offset {}] {:?}: {}",
            self.position, self.kind, self.message
        )
    }
}

impl std::error::Error for CompileError {}
