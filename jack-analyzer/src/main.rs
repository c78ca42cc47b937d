//! Jack Analyzer - Main Entry Point
//!
//! Parses a single `.jack` file, or every `.jack` file in a directory, and
//! pretty-prints the resulting parse tree as XML. Purely diagnostic: it
//! generates no VM code.
//!
//! # Usage
//! ```bash
//! jack-analyzer <input.jack | directory>
//! ```
//! Output files are named `<ClassName>.xml` and are written into an
//! `out_analyzer` subdirectory created beside the input (or inside the
//! input directory, in directory mode).

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use jack_analyzer::{analyze_unit, read_source};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.jack | directory>", args[0]);
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

    let (class_paths, output_dir) = if path.is_dir() {
        (collect_jack_files(path)?, path.join("out_analyzer"))
    } else {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        (vec![path.to_path_buf()], dir.join("out_analyzer"))
    };

    if class_paths.is_empty() {
        return Err(format!("no .jack files found in {input_path}").into());
    }

    fs::create_dir_all(&output_dir)?;

    for class_path in &class_paths {
        let source = read_source(class_path.to_str().unwrap_or_default())?;
        let file_name = class_path.to_string_lossy().into_owned();
        let xml_lines = analyze_unit(&file_name, &source)?;

        let stem = class_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown");
        let out_path = output_dir.join(format!("{stem}.xml"));
        fs::write(&out_path, format!("{}\n", xml_lines.join("\n")))?;
        println!("{file_name}: analyzed to {}", out_path.display());
    }

    println!("Analysis complete. Output written to {}", output_dir.display());
    Ok(())
}

/// Collects every `.jack` file directly inside `dir`, sorted lexicographically
/// by file name so analysis order is deterministic across platforms.
fn collect_jack_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "jack"))
        .collect();
    files.sort();
    Ok(files)
}
