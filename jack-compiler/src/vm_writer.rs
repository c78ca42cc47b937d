//! Thin textual emitter for the VM stack-machine language.
//!
//! Mirrors the role split of `vm-translator`'s own `CodeWriter`: this module
//! only knows how to format an already-decided VM command as text. Deciding
//! which command to emit, and in what order, is the compilation engine's job.

use std::io::{self, Write};

pub struct VmWriter<W: Write> {
    output: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(output: W) -> Self {
        VmWriter { output }
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    pub fn write_push(&mut self, segment: &str, index: u16) -> io::Result<()> {
        writeln!(self.output, "push {segment} {index}")
    }

    pub fn write_pop(&mut self, segment: &str, index: u16) -> io::Result<()> {
        writeln!(self.output, "pop {segment} {index}")
    }

    pub fn write_arithmetic(&mut self, command: &str) -> io::Result<()> {
        writeln!(self.output, "{command}")
    }

    pub fn write_label(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.output, "label {label}")
    }

    pub fn write_goto(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.output, "goto {label}")
    }

    pub fn write_if(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.output, "if-goto {label}")
    }

    pub fn write_call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        writeln!(self.output, "call {name} {n_args}")
    }

    pub fn write_function(&mut self, name: &str, n_locals: u16) -> io::Result<()> {
        writeln!(self.output, "function {name} {n_locals}")
    }

    pub fn write_return(&mut self) -> io::Result<()> {
        writeln!(self.output, "return")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(w: VmWriter<Vec<u8>>) -> String {
        String::from_utf8(w.into_inner()).unwrap()
    }

    #[test]
    fn emits_push_pop_and_call_as_plain_text() {
        let mut w = VmWriter::new(Vec::new());
        w.write_push("constant", 7).unwrap();
        w.write_call("Math.multiply", 2).unwrap();
        w.write_return().unwrap();
        let out = text(w);
        assert_eq!(out, "push constant 7\ncall Math.multiply 2\nreturn\n");
    }
}
