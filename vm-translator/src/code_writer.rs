//! Translates parsed VM commands into Hack assembly.
//!
//! Arithmetic, comparison, and the push/pop segment addressing all follow
//! the scratch-register convention of the original CPU emulator project:
//! `R13`/`R14` hold operands while the top of the stack is being rewritten,
//! and comparisons branch through a pair of per-call-site labels rather
//! than a shared subroutine.

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::error::VmTranslatorError;

macro_rules! write_asm {
    ($writer:expr, $($line:literal)*) => {
        $writer.write_all(concat!($($line, "\n"),*).as_bytes())
    };
}

#[derive(Clone, Copy)]
enum SegmentSymbol {
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
    Constant,
}

impl SegmentSymbol {
    fn from_str(segment: &str) -> Option<Self> {
        match segment {
            "local" => Some(SegmentSymbol::Local),
            "argument" => Some(SegmentSymbol::Argument),
            "this" => Some(SegmentSymbol::This),
            "that" => Some(SegmentSymbol::That),
            "temp" => Some(SegmentSymbol::Temp),
            "pointer" => Some(SegmentSymbol::Pointer),
            "static" => Some(SegmentSymbol::Static),
            "constant" => Some(SegmentSymbol::Constant),
            _ => None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            SegmentSymbol::Local => "LCL",
            SegmentSymbol::Argument => "ARG",
            SegmentSymbol::This => "THIS",
            SegmentSymbol::That => "THAT",
            SegmentSymbol::Temp => "R5",
            SegmentSymbol::Pointer => "THIS",
            SegmentSymbol::Static => "STATIC",
            SegmentSymbol::Constant => "CONSTANT",
        }
    }
}

pub struct CodeWriter<W: Write> {
    output: W,
    label_counter: usize,
    call_counter: usize,
    /// File stem used to namespace `static` segment variables.
    filename: String,
    /// Original source name, carried through to diagnostics.
    source_name: String,
    /// Name of the function currently being emitted, for `functionName$label`
    /// scoping. Empty before the first `function` command, which is legal
    /// for top-level test scripts that never call into a function.
    current_function: String,
}

impl<W: Write> CodeWriter<W> {
    pub fn new(output: W) -> Self {
        CodeWriter {
            output,
            label_counter: 0,
            call_counter: 0,
            filename: String::new(),
            source_name: String::new(),
            current_function: String::new(),
        }
    }

    #[inline]
    pub fn set_filename(&mut self, filename: &str) {
        let name = std::path::Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown");
        self.filename.clear();
        self.filename.push_str(name);
        self.source_name.clear();
        self.source_name.push_str(filename);
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    fn scoped_label(&self, label: &str) -> String {
        if self.current_function.is_empty() {
            label.to_string()
        } else {
            format!("{}${}", self.current_function, label)
        }
    }

    /// Writes the bootstrap code that initializes `SP` to 256 and calls
    /// `Sys.init`. Emitted exactly once, before any translation unit, when
    /// the translator runs in directory mode.
    pub fn write_init(&mut self) -> Result<(), VmTranslatorError> {
        write_asm!(self.output,
            "// bootstrap"
            "@256"
            "D=A"
            "@SP"
            "M=D"
        )?;
        self.write_call("Sys.init", 0, 0)
    }

    pub fn write_arithmetic(&mut self, command: &str, line: usize) -> Result<(), VmTranslatorError> {
        writeln!(self.output, "// {command}")?;

        match command {
            "add" => Ok(self.write_binary_op("D+M")?),
            "sub" => Ok(self.write_binary_op("D-M")?),
            "and" => Ok(self.write_binary_op("D&M")?),
            "or" => Ok(self.write_binary_op("D|M")?),
            "neg" => Ok(self.write_unary_op(true)?),
            "not" => Ok(self.write_unary_op(false)?),
            "eq" => Ok(self.write_comparison("JEQ")?),
            "gt" => Ok(self.write_comparison("JGT")?),
            "lt" => Ok(self.write_comparison("JLT")?),
            _ => Err(VmTranslatorError::user(
                &self.source_name,
                line,
                format!("unknown arithmetic command '{command}'"),
            )),
        }
    }

    #[inline]
    fn write_binary_op(&mut self, operation: &str) -> Result<(), std::io::Error> {
        write!(
            self.output,
            "@SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             @R14\n\
             M=D\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             @R13\n\
             M=D\n\
             @R13\n\
             D=M\n\
             @R14\n\
             D={operation}\n"
        )?;
        self.write_push_d()
    }

    #[inline]
    fn write_unary_op(&mut self, is_neg: bool) -> Result<(), std::io::Error> {
        write_asm!(self.output,
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )?;

        if is_neg {
            write_asm!(self.output,
                "@0"
                "D=A-D"
            )?;
        } else {
            write_asm!(self.output, "D=!D")?;
        }

        self.write_push_d()
    }

    #[inline]
    fn write_comparison(&mut self, jump: &str) -> Result<(), std::io::Error> {
        let label_prefix = match jump {
            "JEQ" => "EQ",
            "JGT" => "GT",
            "JLT" => "LT",
            _ => jump,
        };
        let label_num = self.label_counter;
        self.label_counter += 1;

        write!(
            self.output,
            "@SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             @R14\n\
             M=D\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             @R13\n\
             M=D\n\
             @R13\n\
             D=M\n\
             @R14\n\
             D=D-M\n\
             @{label_prefix}{label_num}\n\
             D;{jump}\n\
             @SP\n\
             A=M\n\
             M=0\n\
             @SP\n\
             M=M+1\n\
             @END{label_prefix}{label_num}\n\
             0;JMP\n\
             ({label_prefix}{label_num})\n\
             @SP\n\
             A=M\n\
             M=-1\n\
             @SP\n\
             M=M+1\n\
             (END{label_prefix}{label_num})\n"
        )
    }

    pub fn write_push_pop(
        &mut self,
        command: &str,
        segment: &str,
        index: i32,
        line: usize,
    ) -> Result<(), VmTranslatorError> {
        writeln!(self.output, "// {command} {segment} {index}")?;

        match command {
            "push" => self.write_push(segment, index, line),
            "pop" => self.write_pop(segment, index, line),
            _ => Err(VmTranslatorError::user(
                &self.source_name,
                line,
                format!("unknown stack command '{command}'"),
            )),
        }
    }

    #[inline]
    fn write_push(&mut self, segment: &str, index: i32, line: usize) -> Result<(), VmTranslatorError> {
        match SegmentSymbol::from_str(segment) {
            Some(SegmentSymbol::Constant) => {
                write!(self.output, "@{index}\nD=A\n")?;
                Ok(self.write_push_d()?)
            }
            Some(seg)
                if matches!(
                    seg,
                    SegmentSymbol::Local
                        | SegmentSymbol::Argument
                        | SegmentSymbol::This
                        | SegmentSymbol::That
                ) =>
            {
                let segment_symbol = seg.symbol();
                write!(self.output, "@{segment_symbol}\nD=M\n@{index}\nA=D+A\nD=M\n")?;
                Ok(self.write_push_d()?)
            }
            Some(SegmentSymbol::Temp) => {
                write!(self.output, "@R5\nD=A\n@{index}\nA=D+A\nD=M\n")?;
                Ok(self.write_push_d()?)
            }
            Some(SegmentSymbol::Pointer) => {
                write!(self.output, "@THIS\nD=A\n@{index}\nA=D+A\nD=M\n")?;
                Ok(self.write_push_d()?)
            }
            Some(SegmentSymbol::Static) => {
                write!(self.output, "@{}.{index}\nD=M\n", self.filename)?;
                Ok(self.write_push_d()?)
            }
            None => Err(VmTranslatorError::user(
                &self.source_name,
                line,
                format!("unknown segment '{segment}'"),
            )),
        }
    }

    #[inline]
    fn write_pop(&mut self, segment: &str, index: i32, line: usize) -> Result<(), VmTranslatorError> {
        match SegmentSymbol::from_str(segment) {
            Some(seg)
                if matches!(
                    seg,
                    SegmentSymbol::Local
                        | SegmentSymbol::Argument
                        | SegmentSymbol::This
                        | SegmentSymbol::That
                ) =>
            {
                let segment_symbol = seg.symbol();
                write!(self.output, "@{segment_symbol}\nD=M\n@{index}\nD=D+A\n@R13\nM=D\n")?;
                self.write_pop_to_d()?;
                write_asm!(self.output,
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
                Ok(())
            }
            Some(SegmentSymbol::Temp) => {
                write!(self.output, "@5\nD=A\n@{index}\nD=D+A\n@R13\nM=D\n")?;
                self.write_pop_to_d()?;
                write_asm!(self.output,
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
                Ok(())
            }
            Some(SegmentSymbol::Pointer) => {
                write!(self.output, "@THIS\nD=A\n@{index}\nD=D+A\n@R13\nM=D\n")?;
                self.write_pop_to_d()?;
                write_asm!(self.output,
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
                Ok(())
            }
            Some(SegmentSymbol::Static) => {
                self.write_pop_to_d()?;
                write!(self.output, "@{}.{index}\nM=D\n", self.filename)?;
                Ok(())
            }
            _ => Err(VmTranslatorError::user(
                &self.source_name,
                line,
                format!("cannot pop to segment '{segment}'"),
            )),
        }
    }

    pub fn write_label(&mut self, label: &str) -> Result<(), VmTranslatorError> {
        let scoped = self.scoped_label(label);
        writeln!(self.output, "({scoped})")?;
        Ok(())
    }

    pub fn write_goto(&mut self, label: &str) -> Result<(), VmTranslatorError> {
        let scoped = self.scoped_label(label);
        write!(self.output, "@{scoped}\n0;JMP\n")?;
        Ok(())
    }

    pub fn write_if(&mut self, label: &str) -> Result<(), VmTranslatorError> {
        let scoped = self.scoped_label(label);
        self.write_pop_to_d()?;
        write!(self.output, "@{scoped}\nD;JNE\n")?;
        Ok(())
    }

    pub fn write_function(&mut self, name: &str, n_locals: i32) -> Result<(), VmTranslatorError> {
        self.current_function.clear();
        self.current_function.push_str(name);

        writeln!(self.output, "({name})")?;
        for _ in 0..n_locals {
            write_asm!(self.output,
                "@SP"
                "A=M"
                "M=0"
                "@SP"
                "M=M+1"
            )?;
        }
        Ok(())
    }

    pub fn write_call(
        &mut self,
        name: &str,
        n_args: i32,
        _line: usize,
    ) -> Result<(), VmTranslatorError> {
        let return_label = format!("{name}$ret.{}", self.call_counter);
        self.call_counter += 1;

        write!(
            self.output,
            "@{return_label}\n\
             D=A\n\
             @SP\n\
             A=M\n\
             M=D\n\
             @SP\n\
             M=M+1\n"
        )?;

        for segment in ["LCL", "ARG", "THIS", "THAT"] {
            write!(self.output, "@{segment}\nD=M\n@SP\nA=M\nM=D\n@SP\nM=M+1\n")?;
        }

        write!(
            self.output,
            "@SP\n\
             D=M\n\
             @5\n\
             D=D-A\n\
             @{n_args}\n\
             D=D-A\n\
             @ARG\n\
             M=D\n\
             @SP\n\
             D=M\n\
             @LCL\n\
             M=D\n\
             @{name}\n\
             0;JMP\n\
             ({return_label})\n"
        )?;
        Ok(())
    }

    pub fn write_return(&mut self) -> Result<(), VmTranslatorError> {
        write!(
            self.output,
            "@LCL\n\
             D=M\n\
             @R13\n\
             M=D\n\
             @5\n\
             A=D-A\n\
             D=M\n\
             @R14\n\
             M=D\n\
             @SP\n\
             A=M-1\n\
             D=M\n\
             @ARG\n\
             A=M\n\
             M=D\n\
             @ARG\n\
             D=M+1\n\
             @SP\n\
             M=D\n\
             @R13\n\
             AM=M-1\n\
             D=M\n\
             @THAT\n\
             M=D\n\
             @R13\n\
             AM=M-1\n\
             D=M\n\
             @THIS\n\
             M=D\n\
             @R13\n\
             AM=M-1\n\
             D=M\n\
             @ARG\n\
             M=D\n\
             @R13\n\
             AM=M-1\n\
             D=M\n\
             @LCL\n\
             M=D\n\
             @R14\n\
             A=M\n\
             0;JMP\n"
        )?;
        Ok(())
    }

    #[inline]
    fn write_push_d(&mut self) -> Result<(), std::io::Error> {
        write_asm!(self.output,
            "@SP"
            "A=M"
            "M=D"
            "@SP"
            "M=M+1"
        )
    }

    #[inline]
    fn write_pop_to_d(&mut self) -> Result<(), std::io::Error> {
        write_asm!(self.output,
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )
    }

    pub fn close(&mut self) -> Result<(), VmTranslatorError> {
        self.output.flush()?;
        Ok(())
    }
}

impl CodeWriter<BufWriter<File>> {
    /// Creates a new `CodeWriter` that writes straight to the named output
    /// file, buffered the same way the original CPU emulator's writer was.
    pub fn create(output_filename: &str) -> Result<Self, std::io::Error> {
        let file = File::create(output_filename)?;
        Ok(CodeWriter::new(BufWriter::with_capacity(8192, file)))
    }
}
