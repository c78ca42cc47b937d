use std::fmt;

use jack_tokenizer::TokenizerError;

#[derive(Debug)]
pub enum AnalyzerError {
    Io(std::io::Error),
    User {
        file: String,
        line: usize,
        message: String,
    },
}

impl AnalyzerError {
    #[must_use]
    pub fn user(file: &str, line: usize, message: impl Into<String>) -> Self {
        AnalyzerError::User {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerError::Io(e) => write!(f, "{e}"),
            AnalyzerError::User { file, line, message } => {
                write!(f, "Error in file {file} at line {line}: {message}")
            }
        }
    }
}

impl std::error::Error for AnalyzerError {}

impl From<std::io::Error> for AnalyzerError {
    fn from(e: std::io::Error) -> Self {
        AnalyzerError::Io(e)
    }
}

impl From<TokenizerError> for AnalyzerError {
    fn from(e: TokenizerError) -> Self {
        match e {
            TokenizerError::User { file, line, message } => AnalyzerError::User { file, line, message },
            TokenizerError::Io(io) => AnalyzerError::Io(io),
            TokenizerError::InvalidAccessor(msg) => AnalyzerError::user("", 0, msg),
        }
    }
}
