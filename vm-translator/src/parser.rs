//! Parser for the VM language: splits a `.vm` source file into commands,
//! stripping `//` comments and blank lines, and classifies each command by
//! its first token.

use std::fs::File;
use std::io::{BufRead, BufReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    If,
    Function,
    Return,
    Call,
}

struct RawLine {
    text: String,
    line_idx: usize,
}

pub struct Parser {
    lines: Vec<RawLine>,
    current_line: usize,
    current_command: String,
    current_command_line_idx: usize,
    /// Cached parts of the current command to avoid repeated parsing
    cached_parts: Vec<String>,
}

impl Parser {
    pub fn new(filename: &str) -> Result<Self, std::io::Error> {
        let file = File::open(filename)?;
        let reader = BufReader::new(file);
        let raw_lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Ok(Self::from_lines(&raw_lines))
    }

    /// Builds a parser over in-memory source lines, stripping `//` comments
    /// and blank lines the same way [`Parser::new`] does for a file.
    pub fn from_lines(raw_lines: &[String]) -> Self {
        let mut lines = Vec::new();
        for (idx, line) in raw_lines.iter().enumerate() {
            let line = if let Some(pos) = line.find("//") {
                &line[..pos]
            } else {
                line.as_str()
            };

            let trimmed = line.trim();

            if !trimmed.is_empty() {
                lines.push(RawLine {
                    text: trimmed.to_string(),
                    line_idx: idx,
                });
            }
        }

        Parser {
            lines,
            current_line: 0,
            current_command: String::new(),
            current_command_line_idx: 0,
            cached_parts: Vec::new(),
        }
    }

    #[inline]
    pub fn has_more_commands(&self) -> bool {
        self.current_line < self.lines.len()
    }

    #[inline]
    pub fn advance(&mut self) {
        if self.has_more_commands() {
            // Use swap to avoid allocation
            std::mem::swap(
                &mut self.current_command,
                &mut self.lines[self.current_line].text,
            );
            self.current_command_line_idx = self.lines[self.current_line].line_idx;

            // Parse and cache command parts once
            self.cached_parts.clear();
            self.cached_parts.extend(
                self.current_command
                    .split_whitespace()
                    .map(|s| s.to_string()),
            );

            self.current_line += 1;
        }
    }

    /// 0-based source line index of the current command, for diagnostics.
    #[inline]
    pub fn line_idx(&self) -> usize {
        self.current_command_line_idx
    }

    #[inline]
    pub fn command_type(&self) -> CommandType {
        debug_assert!(!self.cached_parts.is_empty(), "Empty command");

        match self.cached_parts[0].as_str() {
            "push" => CommandType::Push,
            "pop" => CommandType::Pop,
            "label" => CommandType::Label,
            "goto" => CommandType::Goto,
            "if-goto" => CommandType::If,
            "function" => CommandType::Function,
            "call" => CommandType::Call,
            "return" => CommandType::Return,
            _ => CommandType::Arithmetic,
        }
    }

    #[inline]
    pub fn arg1(&self) -> &str {
        let cmd_type = self.command_type();
        match cmd_type {
            CommandType::Arithmetic => &self.cached_parts[0],
            CommandType::Return => panic!("arg1 should not be called for Return"),
            _ => {
                debug_assert!(self.cached_parts.len() > 1, "No arg1 found");
                &self.cached_parts[1]
            }
        }
    }

    #[inline]
    pub fn arg2(&self) -> Result<i32, std::num::ParseIntError> {
        let cmd_type = self.command_type();
        match cmd_type {
            CommandType::Push | CommandType::Pop | CommandType::Function | CommandType::Call => {
                debug_assert!(self.cached_parts.len() > 2, "No arg2 found");
                self.cached_parts[2].parse()
            }
            _ => panic!("arg2 should not be called for this command type"),
        }
    }
}

/// A fully classified command, decoupled from the streaming [`Parser`]
/// cursor so a whole translation unit can be parsed up front and handed to
/// the code generator as a plain slice.
pub struct ParsedCommand {
    pub command_type: CommandType,
    pub arg1: String,
    pub arg2_raw: String,
    pub line_idx: usize,
}

impl ParsedCommand {
    pub fn arg2(&self) -> Result<i32, std::num::ParseIntError> {
        self.arg2_raw.parse()
    }
}

/// Parses every command in `source`, in order. Comment-only and blank lines
/// are dropped, matching [`Parser`].
pub fn parse_source(source: &[String]) -> Vec<ParsedCommand> {
    let mut parser = Parser::from_lines(source);
    let mut commands = Vec::new();

    while parser.has_more_commands() {
        parser.advance();
        let command_type = parser.command_type();
        let arg1 = match command_type {
            CommandType::Return => String::new(),
            _ => parser.arg1().to_string(),
        };
        let arg2_raw = match command_type {
            CommandType::Push | CommandType::Pop | CommandType::Function | CommandType::Call => {
                parser
                    .cached_parts
                    .get(2)
                    .cloned()
                    .unwrap_or_default()
            }
            _ => String::new(),
        };
        commands.push(ParsedCommand {
            command_type,
            arg1,
            arg2_raw,
            line_idx: parser.line_idx(),
        });
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "vm_translator_parser_test_{}_{}.vm",
            std::process::id(),
            contents.len()
        ));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn classifies_every_command_type() {
        let path = write_temp(
            "push constant 7\npop local 0\nadd\nlabel L\ngoto L\nif-goto L\nfunction f 2\ncall f 2\nreturn\n",
        );
        let mut parser = Parser::new(path.to_str().unwrap()).unwrap();
        let expected = [
            CommandType::Push,
            CommandType::Pop,
            CommandType::Arithmetic,
            CommandType::Label,
            CommandType::Goto,
            CommandType::If,
            CommandType::Function,
            CommandType::Call,
            CommandType::Return,
        ];
        for exp in expected {
            assert!(parser.has_more_commands());
            parser.advance();
            assert_eq!(parser.command_type(), exp);
        }
        assert!(!parser.has_more_commands());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn strips_comments_and_blank_lines() {
        let path = write_temp("// full comment\n\npush constant 1 // trailing\n");
        let mut parser = Parser::new(path.to_str().unwrap()).unwrap();
        parser.advance();
        assert_eq!(parser.arg1(), "constant");
        assert_eq!(parser.arg2().unwrap(), 1);
        std::fs::remove_file(path).ok();
    }
}
