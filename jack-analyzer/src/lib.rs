//! XML pretty-printer for the Jack language parse tree (`Nand2Tetris`).
//!
//! A thin diagnostic front end: it drives the same [`jack_tokenizer::Tokenizer`]
//! `jack-compiler` uses, walks the identical grammar, but only ever echoes
//! tokens as indented, escaped XML. No symbol table, no code generation;
//! it exists to let a reader see the parse tree a class produces.
//!
//! # Example
//!
//! ```rust
//! use jack_analyzer::analyze_unit;
//!
//! let source = vec!["class Main { function void main() { return; } }".to_string()];
//! let xml = analyze_unit("Main.jack", &source).unwrap();
//! assert!(xml.iter().any(|l| l.contains("<class>")));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod compilation_engine;
pub mod error;

pub use compilation_engine::CompilationEngine;
pub use error::AnalyzerError;

/// Compiles one Jack class into its indented XML parse tree.
pub fn analyze_unit(file_name: &str, source: &[String]) -> Result<Vec<String>, AnalyzerError> {
    let engine = CompilationEngine::new(file_name, source, Vec::new())?;
    let bytes = engine.compile()?;
    let text = String::from_utf8(bytes).expect("generated XML is always valid UTF-8");
    Ok(text.lines().map(str::to_string).collect())
}

/// Reads a `.jack` file from disk into its source lines.
pub fn read_source(path: &str) -> Result<Vec<String>, std::io::Error> {
    use std::io::BufRead;

    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    reader.lines().collect()
}
