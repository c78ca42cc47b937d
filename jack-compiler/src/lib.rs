//! Recursive-descent compiler for the Jack language (`Nand2Tetris`), lowering
//! a single class directly to VM code.
//!
//! # Architecture
//!
//! - [`symbol_table`]: two-scope identifier resolution with per-kind indices
//! - [`vm_writer`]: thin textual emitter for the VM stack-machine language
//! - [`compilation_engine`]: the fused recursive-descent parser and code generator
//! - [`error`]: the `(file, line, message)` diagnostic shape shared by every stage
//!
//! Every Jack source file holds exactly one class, so [`compile_unit`]
//! compiles one file into one `.vm` translation unit. Multi-class programs
//! are driven one file at a time by the caller (see `main.rs`).
//!
//! # Example
//!
//! ```rust
//! use jack_compiler::compile_unit;
//!
//! let source = vec![
//!     "class Main {".to_string(),
//!     "  function void main() { do Output.printString(\"hi\"); return; }".to_string(),
//!     "}".to_string(),
//! ];
//! let vm = compile_unit("Main.jack", &source).unwrap();
//! assert!(vm.iter().any(|l| l == "function Main.main 0"));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

pub mod compilation_engine;
pub mod error;
pub mod symbol_table;
pub mod vm_writer;

pub use compilation_engine::CompilationEngine;
pub use error::CompilerError;
pub use symbol_table::{Kind, SymbolTable};
pub use vm_writer::VmWriter;

/// Compiles one Jack class into its VM translation unit.
pub fn compile_unit(file_name: &str, source: &[String]) -> Result<Vec<String>, CompilerError> {
    let engine = CompilationEngine::new(file_name, source, Vec::new())?;
    let bytes = engine.compile()?;
    let text = String::from_utf8(bytes).expect("generated VM code is always valid UTF-8");
    Ok(text.lines().map(str::to_string).collect())
}

/// Reads a `.jack` file from disk into its source lines.
pub fn read_source(path: &str) -> Result<Vec<String>, std::io::Error> {
    use std::io::BufRead;

    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    reader.lines().collect()
}
