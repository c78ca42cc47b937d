//! Error type for the assembler driver.
//!
//! Follows the shape described for every stage of this toolchain: a user error
//! carries the file name, the 0-based source line, and a message, and `Display`s
//! in the exact form `Error in file <F> at line <L>: <msg>`. Programming errors
//! (calling a parser accessor against the wrong command type) are not
//! represented here; they are invariant violations and `panic!` instead.

use std::fmt;

#[derive(Debug)]
pub enum AssemblerError {
    Io(std::io::Error),
    User {
        file: String,
        line: usize,
        message: String,
    },
}

impl AssemblerError {
    pub fn user(file: &str, line: usize, message: impl Into<String>) -> Self {
        Self::User {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }
}

impl std::error::Error for AssemblerError {}

impl fmt::Display for AssemblerError {
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

impl From<std::io::Error> for AssemblerError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}
