//! Tokenizer for the Jack language (`Nand2Tetris`).
//!
//! Eagerly lexes an entire `.jack` source into a flat token stream on
//! construction, then hands them out one at a time through a cursor, the
//! same shape the assembler's `ParserLines` and the VM translator's
//! `Parser` use for their own command streams.
//!
//! # Architecture
//!
//! - [`keyword`]: the 21-keyword and 19-symbol perfect hash tables
//! - [`token`]: the classified token representation
//! - [`error`]: the `(file, line, message)` diagnostic shape shared by every stage
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod error;
pub mod keyword;
mod token;

pub use error::TokenizerError;
pub use keyword::Keyword;
pub use token::TokenType;

use token::{Token, TokenValue};

pub struct Tokenizer {
    file_name: String,
    tokens: Vec<Token>,
    cursor: Option<usize>,
}

impl Tokenizer {
    /// Lexes the entire source, eagerly, the way the contract requires.
    pub fn new(file_name: &str, source: &[String]) -> Result<Self, TokenizerError> {
        let tokens = tokenize(file_name, source)?;
        Ok(Tokenizer {
            file_name: file_name.to_string(),
            tokens,
            cursor: None,
        })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn has_more_tokens(&self) -> bool {
        match self.cursor {
            None => !self.tokens.is_empty(),
            Some(idx) => idx + 1 < self.tokens.len(),
        }
    }

    /// Advances to the next token. Idempotent at end of stream, per contract.
    pub fn advance(&mut self) {
        match self.cursor {
            None if !self.tokens.is_empty() => self.cursor = Some(0),
            Some(idx) if idx + 1 < self.tokens.len() => self.cursor = Some(idx + 1),
            _ => {}
        }
    }

    fn current(&self) -> &Token {
        let idx = self.cursor.expect("advance() must be called before inspecting a token");
        &self.tokens[idx]
    }

    #[must_use]
    pub fn token_line_idx(&self) -> usize {
        self.current().line_idx
    }

    #[must_use]
    pub fn token_type(&self) -> TokenType {
        self.current().token_type()
    }

    pub fn keyword(&self) -> Result<Keyword, TokenizerError> {
        match self.current().value {
            TokenValue::Keyword(kw) => Ok(kw),
            _ => Err(TokenizerError::InvalidAccessor(
                "keyword() called on a non-keyword token",
            )),
        }
    }

    pub fn symbol(&self) -> Result<char, TokenizerError> {
        match self.current().value {
            TokenValue::Symbol(c) => Ok(c),
            _ => Err(TokenizerError::InvalidAccessor(
                "symbol() called on a non-symbol token",
            )),
        }
    }

    pub fn identifier(&self) -> Result<&str, TokenizerError> {
        match &self.current().value {
            TokenValue::Identifier(s) => Ok(s.as_str()),
            _ => Err(TokenizerError::InvalidAccessor(
                "identifier() called on a non-identifier token",
            )),
        }
    }

    pub fn int_val(&self) -> Result<i16, TokenizerError> {
        match self.current().value {
            TokenValue::IntConst(v) => Ok(v),
            _ => Err(TokenizerError::InvalidAccessor(
                "int_val() called on a non-integer-constant token",
            )),
        }
    }

    pub fn string_val(&self) -> Result<&str, TokenizerError> {
        match &self.current().value {
            TokenValue::StringConst(s) => Ok(s.as_str()),
            _ => Err(TokenizerError::InvalidAccessor(
                "string_val() called on a non-string-constant token",
            )),
        }
    }
}

/// Lexes `source` into a flat token stream, per the lexical rules: strip
/// `//` comments, strip `/* ... */` block comments (which may span lines),
/// split the remainder on symbol characters, string-constant delimiters and
/// whitespace.
fn tokenize(file_name: &str, source: &[String]) -> Result<Vec<Token>, TokenizerError> {
    let mut tokens = Vec::new();
    let mut in_block_comment = false;

    for (line_idx, raw_line) in source.iter().enumerate() {
        let mut line: &str = raw_line;

        if in_block_comment {
            match line.find("*/") {
                Some(end) => {
                    line = &line[end + 2..];
                    in_block_comment = false;
                }
                None => continue,
            }
        }

        // Whichever comment marker starts first on the remaining text wins,
        // per the rule order: a `//` strips the rest of the line outright
        // (even one that itself contains an unterminated `/*`); a `/*` that
        // starts first opens a block comment, which may close later on the
        // same line, at which point scanning resumes on what follows it.
        let mut rest = line;
        let mut cleaned = String::new();
        loop {
            let line_comment_pos = find_line_comment(rest);
            let block_comment_pos = rest.find("/*");

            match (line_comment_pos, block_comment_pos) {
                (Some(lc), Some(bc)) if lc < bc => {
                    cleaned.push_str(&rest[..lc]);
                    break;
                }
                (Some(lc), None) => {
                    cleaned.push_str(&rest[..lc]);
                    break;
                }
                (_, Some(bc)) => {
                    cleaned.push_str(&rest[..bc]);
                    match rest[bc + 2..].find("*/") {
                        Some(end) => {
                            rest = &rest[bc + 2 + end + 2..];
                        }
                        None => {
                            in_block_comment = true;
                            break;
                        }
                    }
                }
                (None, None) => {
                    cleaned.push_str(rest);
                    break;
                }
            }
        }

        lex_line(file_name, line_idx, &cleaned, &mut tokens)?;
    }

    Ok(tokens)
}

/// Finds the start of a `//` line comment, ignoring one that falls inside a
/// string constant (Jack string constants cannot span lines or contain a
/// bare `"`, so a simple quote count suffices).
fn find_line_comment(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut i = 0;
    while i + 1 < bytes.len() {
        match bytes[i] {
            b'"' => in_string = !in_string,
            b'/' if !in_string && bytes[i + 1] == b'/' => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

fn lex_line(
    file_name: &str,
    line_idx: usize,
    line: &str,
    tokens: &mut Vec<Token>,
) -> Result<(), TokenizerError> {
    let chars: Vec<char> = line.chars().collect();
    let mut start = 0;

    while start < chars.len() {
        let c = chars[start];

        if c.is_whitespace() {
            start += 1;
        } else if keyword::is_symbol_char(c) {
            tokens.push(Token {
                value: TokenValue::Symbol(c),
                line_idx,
            });
            start += 1;
        } else if c == '"' {
            let end = chars[start + 1..].iter().position(|&ch| ch == '"');
            let Some(rel_end) = end else {
                return Err(TokenizerError::user(
                    file_name,
                    line_idx,
                    "Unterminated string constant",
                ));
            };
            let content: String = chars[start + 1..start + 1 + rel_end].iter().collect();
            tokens.push(Token {
                value: TokenValue::StringConst(content),
                line_idx,
            });
            start = start + 1 + rel_end + 1;
        } else {
            let mut end = start;
            while end < chars.len() && !chars[end].is_whitespace() && !keyword::is_symbol_char(chars[end]) && chars[end] != '"' {
                end += 1;
            }
            let lexeme: String = chars[start..end].iter().collect();
            tokens.push(classify(file_name, line_idx, &lexeme)?);
            start = end;
        }
    }

    Ok(())
}

fn classify(file_name: &str, line_idx: usize, lexeme: &str) -> Result<Token, TokenizerError> {
    if let Some(&kw) = keyword::KEYWORDS.get(lexeme) {
        return Ok(Token {
            value: TokenValue::Keyword(kw),
            line_idx,
        });
    }

    let mut chars = lexeme.chars();
    let first = chars.next().expect("lexeme is never empty");

    if first.is_ascii_digit() {
        if lexeme.chars().all(|c| c.is_ascii_digit()) {
            let value: i32 = lexeme.parse().map_err(|_| {
                TokenizerError::user(file_name, line_idx, format!("'{lexeme}' is not a valid integer constant"))
            })?;
            if !(0..=32767).contains(&value) {
                return Err(TokenizerError::user(
                    file_name,
                    line_idx,
                    format!("integer constant '{lexeme}' out of range (0..32767)"),
                ));
            }
            #[allow(clippy::cast_possible_truncation)]
            return Ok(Token {
                value: TokenValue::IntConst(value as i16),
                line_idx,
            });
        }
        return Err(TokenizerError::user(
            file_name,
            line_idx,
            format!("invalid token '{lexeme}'"),
        ));
    }

    if (first.is_alphabetic() || first == '_')
        && lexeme.chars().all(|c| c.is_alphanumeric() || c == '_')
    {
        return Ok(Token {
            value: TokenValue::Identifier(lexeme.to_string()),
            line_idx,
        });
    }

    Err(TokenizerError::user(
        file_name,
        line_idx,
        format!("invalid token '{lexeme}'"),
    ))
}
