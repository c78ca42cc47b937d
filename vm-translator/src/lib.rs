//! VM Translator for the `Nand2Tetris` stack machine language.
//!
//! Translates one or more `.vm` translation units into Hack assembly.
//!
//! # Architecture
//!
//! - [`parser`]: splits a `.vm` file into commands, tracking source lines
//! - [`code_writer`]: emits Hack assembly for each command
//! - [`error`]: the `(file, line, message)` diagnostic shape shared by every stage
//!
//! # Example
//!
//! ```rust
//! use vm_translator::{translate_unit, TranslationUnit};
//!
//! let unit = TranslationUnit {
//!     name: "Foo.vm".to_string(),
//!     source: vec!["push constant 7".to_string(), "push constant 8".to_string(), "add".to_string()],
//! };
//! let asm = translate_unit(&[unit], false).unwrap();
//! assert!(asm.iter().any(|line| line == "@7"));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod code_writer;
pub mod error;
pub mod parser;

pub use code_writer::CodeWriter;
pub use error::VmTranslatorError;
pub use parser::{CommandType, Parser};

use std::io::{BufRead, Write};

/// One `.vm` source file: its name (used for `static` segment namespacing
/// and diagnostics) and its lines of source text.
pub struct TranslationUnit {
    pub name: String,
    pub source: Vec<String>,
}

/// Translates a sequence of translation units into Hack assembly, returning
/// the output as a line-per-`String` vector. When `bootstrap` is set the
/// stack-initializing prologue that calls `Sys.init` is emitted first, the
/// way the translator runs when pointed at a directory of `.vm` files.
pub fn translate_unit(
    units: &[TranslationUnit],
    bootstrap: bool,
) -> Result<Vec<String>, VmTranslatorError> {
    let mut writer = CodeWriter::new(Vec::new());

    if bootstrap {
        writer.write_init()?;
    }

    for unit in units {
        writer.set_filename(&unit.name);
        translate_lines(&mut writer, &unit.name, &unit.source)?;
    }

    writer.close()?;
    let bytes = writer.into_inner();
    let text = String::from_utf8(bytes).expect("generated assembly is always valid UTF-8");
    Ok(text.lines().map(str::to_string).collect())
}

fn translate_lines<W: Write>(
    writer: &mut CodeWriter<W>,
    unit_name: &str,
    source: &[String],
) -> Result<(), VmTranslatorError> {
    let commands = parser::parse_source(source);

    for command in &commands {
        match command.command_type {
            CommandType::Arithmetic => {
                writer.write_arithmetic(&command.arg1, command.line_idx)?;
            }
            CommandType::Push | CommandType::Pop => {
                let verb = if command.command_type == CommandType::Push {
                    "push"
                } else {
                    "pop"
                };
                let index = command.arg2().map_err(|_| {
                    VmTranslatorError::user(
                        unit_name,
                        command.line_idx,
                        format!("'{}' is not a valid index", command.arg2_raw),
                    )
                })?;
                writer.write_push_pop(verb, &command.arg1, index, command.line_idx)?;
            }
            CommandType::Label => writer.write_label(&command.arg1)?,
            CommandType::Goto => writer.write_goto(&command.arg1)?,
            CommandType::If => writer.write_if(&command.arg1)?,
            CommandType::Function => {
                let n_locals = command.arg2().map_err(|_| {
                    VmTranslatorError::user(
                        unit_name,
                        command.line_idx,
                        format!("'{}' is not a valid local count", command.arg2_raw),
                    )
                })?;
                writer.write_function(&command.arg1, n_locals)?;
            }
            CommandType::Call => {
                let n_args = command.arg2().map_err(|_| {
                    VmTranslatorError::user(
                        unit_name,
                        command.line_idx,
                        format!("'{}' is not a valid argument count", command.arg2_raw),
                    )
                })?;
                writer.write_call(&command.arg1, n_args, command.line_idx)?;
            }
            CommandType::Return => writer.write_return()?,
        }
    }

    Ok(())
}

/// Reads a `.vm` file from disk into a [`TranslationUnit`].
pub fn read_unit(path: &str) -> Result<TranslationUnit, std::io::Error> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let source = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
    Ok(TranslationUnit {
        name: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_simple_push_add() {
        let unit = TranslationUnit {
            name: "Foo.vm".to_string(),
            source: vec![
                "push constant 7".to_string(),
                "push constant 8".to_string(),
                "add".to_string(),
            ],
        };
        let asm = translate_unit(&[unit], false).unwrap();
        assert!(asm.iter().any(|l| l == "@7"));
        assert!(asm.iter().any(|l| l == "@8"));
        assert!(asm.iter().any(|l| l == "D=D+M"));
    }

    #[test]
    fn bootstrap_precedes_unit_output() {
        let unit = TranslationUnit {
            name: "Sys.vm".to_string(),
            source: vec!["function Sys.init 0".to_string(), "return".to_string()],
        };
        let asm = translate_unit(&[unit], true).unwrap();
        assert_eq!(asm[1], "@256");
        assert!(asm.iter().any(|l| l == "(Sys.init)"));
    }

    #[test]
    fn diagnostic_reports_line_index() {
        let unit = TranslationUnit {
            name: "Bad.vm".to_string(),
            source: vec!["push bogus 0".to_string()],
        };
        let err = translate_unit(&[unit], false).unwrap_err();
        assert!(err.to_string().contains("at line 0"));
    }
}
