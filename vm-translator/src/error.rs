//! Error type for the VM translator driver.
//!
//! Mirrors the diagnostic shape used across this toolchain: a user error
//! carries the file name, the 0-based source line, and a message, and
//! `Display`s as `Error in file <F> at line <L>: <msg>`. Calling a code
//! generation method against data that should have been rejected earlier
//! (an accessor on the wrong command type) is a programming error and
//! `panic!`s instead.

use std::fmt;

#[derive(Debug)]
pub enum VmTranslatorError {
    Io(std::io::Error),
    User {
        file: String,
        line: usize,
        message: String,
    },
}

impl VmTranslatorError {
    pub fn user(file: &str, line: usize, message: impl Into<String>) -> Self {
        Self::User {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }
}

impl std::error::Error for VmTranslatorError {}

impl fmt::Display for VmTranslatorError {
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

impl From<std::io::Error> for VmTranslatorError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}
