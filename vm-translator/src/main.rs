//! VM Translator - Main Entry Point
//!
//! Translates a single `.vm` file, or every `.vm` file in a directory, into
//! Hack assembly (`Nand2Tetris`).
//!
//! # Usage
//! ```bash
//! vm-translator <input.vm | directory>
//! ```
//! When pointed at a directory, every `.vm` file is translated in
//! lexicographic order into one combined `.asm` file named after the
//! directory, preceded by the bootstrap code that calls `Sys.init`.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use vm_translator::{read_unit, translate_unit};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.vm | directory>", args[0]);
        process::exit(1);
    }

    let input_path = &args[1];
    if let Err(e) = run(input_path) {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn run(input_path: &str) -> Result<()> {
    let path = Path::new(input_path);

    let (unit_paths, output_path, bootstrap) = if path.is_dir() {
        (collect_vm_files(path)?, directory_output(path), true)
    } else {
        (vec![path.to_path_buf()], path.with_extension("asm"), false)
    };

    if unit_paths.is_empty() {
        return Err(format!("no .vm files found in {input_path}").into());
    }

    let units = unit_paths
        .iter()
        .map(|p| read_unit(p.to_str().unwrap_or_default()))
        .collect::<std::io::Result<Vec<_>>>()?;

    let asm_lines = translate_unit(&units, bootstrap)?;
    fs::write(&output_path, format!("{}\n", asm_lines.join("\n")))?;

    println!(
        "Translation complete: {} -> {}",
        input_path,
        output_path.display()
    );
    Ok(())
}

/// Collects every `.vm` file directly inside `dir`, sorted lexicographically
/// by file name so translation order is deterministic across platforms.
fn collect_vm_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "vm"))
        .collect();
    files.sort();
    Ok(files)
}

/// Directory mode writes one combined `.asm` file named after the
/// directory, placed inside it, matching the original CPU emulator's CLI.
fn directory_output(dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("Output");
    dir.join(format!("{name}.asm"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_output_is_named_after_the_directory() {
        let dir = Path::new("/tmp/MyProgram");
        assert_eq!(
            directory_output(dir),
            PathBuf::from("/tmp/MyProgram/MyProgram.asm")
        );
    }
}
