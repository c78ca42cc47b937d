//! Error type for the Jack compiler.
//!
//! Same `(file, line, message)` diagnostic shape as the tokenizer, assembler
//! and VM translator; the tokenizer's own errors are folded in unchanged.

use std::fmt;

#[derive(Debug)]
pub enum CompilerError {
    Io(std::io::Error),
    User {
        file: String,
        line: usize,
        message: String,
    },
}

impl CompilerError {
    pub fn user(file: &str, line: usize, message: impl Into<String>) -> Self {
        Self::User {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }
}

impl std::error::Error for CompilerError {}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::User {
                file,
                line,
                message,
            } => write!(f, "Error in file {file} at line {line}: {message}"),
        }
    }
}

impl From<std::io::Error> for CompilerError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<jack_tokenizer::TokenizerError> for CompilerError {
    fn from(error: jack_tokenizer::TokenizerError) -> Self {
        match error {
            jack_tokenizer::TokenizerError::Io(e) => Self::Io(e),
            jack_tokenizer::TokenizerError::User {
                file,
                line,
                message,
            } => Self::User {
                file,
                line,
                message,
            },
            jack_tokenizer::TokenizerError::InvalidAccessor(msg) => {
                Self::user("<tokenizer>", 0, format!("Invalid accessor: {msg}"))
            }
        }
    }
}
