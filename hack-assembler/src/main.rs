//! Hack Assembler - Main Entry Point
//!
//! A two-pass assembler for the Hack assembly language (`Nand2Tetris`).
//!
//! # Usage
//! ```bash
//! hack-assembler <input.asm> [output.hack]
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process;

use hack_assembler::assemble;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn read_lines(path: &str) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(Into::into)
}

/// Determines the output file path, defaulting to the input with its
/// extension swapped for `.hack` (written beside the input, per the CLI
/// contract).
fn output_path(input: &str, explicit_output: Option<&str>) -> String {
    explicit_output.map_or_else(
        || {
            Path::new(input)
                .with_extension("hack")
                .to_string_lossy()
                .into_owned()
        },
        std::string::ToString::to_string,
    )
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if !(2..=3).contains(&args.len()) {
        eprintln!("Usage: {} <input.asm> [output.hack]", args[0]);
        process::exit(1);
    }

    let input_path = &args[1];
    let output = output_path(input_path, args.get(2).map(String::as_str));

    if let Err(e) = run(input_path, &output) {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn run(input_path: &str, output: &str) -> Result<()> {
    let lines = read_lines(input_path)?;
    let hack_lines = assemble(input_path, &lines)?;
    fs::write(output, format!("{}\n", hack_lines.join("\n")))?;
    println!("Assembly completed. Output written to {output}");
    Ok(())
}
