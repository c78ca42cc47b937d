//! Error type for the Jack tokenizer.
//!
//! Mirrors the diagnostic shape used across this toolchain: a user error
//! carries the file name, the 0-based source line, and a message, and
//! `Display`s as `Error in file <F> at line <L>: <msg>`.

use std::fmt;

#[derive(Debug)]
pub enum TokenizerError {
    Io(std::io::Error),
    User {
        file: String,
        line: usize,
        message: String,
    },
    /// An accessor was called against the wrong token type. An invariant
    /// violation in the caller, not a malformed-source diagnostic.
    InvalidAccessor(&'static str),
}

impl TokenizerError {
    pub fn user(file: &str, line: usize, message: impl Into<String>) -> Self {
        Self::User {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }
}

impl std::error::Error for TokenizerError {}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::User {
                file,
                line,
                message,
            } => write!(f, "Error in file {file} at line {line}: {message}"),
            Self::InvalidAccessor(msg) => write!(f, "Invalid accessor: {msg}"),
        }
    }
}

impl From<std::io::Error> for TokenizerError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}
