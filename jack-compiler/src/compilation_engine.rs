//! Recursive-descent parser and code generator for the Jack grammar.
//!
//! The parser and the emitter are fused: rather than building an
//! intermediate AST, each grammar production fires its VM-writing actions
//! as it is recognized, one token of lookahead at a time. The recogniser is
//! split into `expect_*` helpers (type-check the current token, failing
//! with a line-qualified diagnostic) and the grammar's `compile_*` methods
//! (which call `expect_*`, capture whatever value is needed, and advance).

use std::io::Write;

use jack_tokenizer::{Keyword, TokenType, Tokenizer};

use crate::error::CompilerError;
use crate::symbol_table::{Kind, SymbolTable};
use crate::vm_writer::VmWriter;

#[derive(Clone, Copy, PartialEq, Eq)]
enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

pub struct CompilationEngine<W: Write> {
    tokenizer: Tokenizer,
    symbols: SymbolTable,
    writer: VmWriter<W>,
    file_name: String,
    class_name: String,
    current_subroutine_kind: SubroutineKind,
    current_subroutine_is_void: bool,
    label_counter: usize,
}

impl<W: Write> CompilationEngine<W> {
    pub fn new(file_name: &str, source: &[String], output: W) -> Result<Self, CompilerError> {
        let tokenizer = Tokenizer::new(file_name, source)?;
        Ok(CompilationEngine {
            tokenizer,
            symbols: SymbolTable::new(),
            writer: VmWriter::new(output),
            file_name: file_name.to_string(),
            class_name: String::new(),
            current_subroutine_kind: SubroutineKind::Function,
            current_subroutine_is_void: true,
            label_counter: 0,
        })
    }

    pub fn compile(mut self) -> Result<W, CompilerError> {
        self.advance_or_error()?;
        self.compile_class()?;

        if self.tokenizer.has_more_tokens() {
            return Err(self.user_error("Extra tokens after class declaration"));
        }

        Ok(self.writer.into_inner())
    }

    // ---------- diagnostics ----------

    fn user_error(&self, message: impl Into<String>) -> CompilerError {
        CompilerError::user(&self.file_name, self.tokenizer.token_line_idx(), message)
    }

    fn advance_or_error(&mut self) -> Result<(), CompilerError> {
        if !self.tokenizer.has_more_tokens() {
            return Err(self.user_error("Unexpected end of input"));
        }
        self.tokenizer.advance();
        Ok(())
    }

    fn is_symbol(&self, c: char) -> bool {
        self.tokenizer.token_type() == TokenType::Symbol
            && self.tokenizer.symbol().expect("checked token type") == c
    }

    fn is_keyword(&self, kw: Keyword) -> bool {
        self.tokenizer.token_type() == TokenType::Keyword
            && self.tokenizer.keyword().expect("checked token type") == kw
    }

    fn is_operator(&self) -> bool {
        self.tokenizer.token_type() == TokenType::Symbol
            && matches!(
                self.tokenizer.symbol().expect("checked token type"),
                '+' | '-' | '*' | '/' | '&' | '|' | '<' | '>' | '='
            )
    }

    fn expect_symbol(&self, c: char) -> Result<(), CompilerError> {
        if self.is_symbol(c) {
            Ok(())
        } else {
            Err(self.user_error(format!("Expected '{c}' symbol")))
        }
    }

    fn expect_keyword(&self, kw: Keyword) -> Result<(), CompilerError> {
        if self.is_keyword(kw) {
            Ok(())
        } else {
            Err(self.user_error(format!("Expected '{kw}' keyword")))
        }
    }

    fn expect_keyword_one_of(&self, allowed: &[Keyword]) -> Result<Keyword, CompilerError> {
        if self.tokenizer.token_type() != TokenType::Keyword {
            return Err(self.user_error("Expected a keyword"));
        }
        let kw = self.tokenizer.keyword().expect("checked token type");
        if allowed.contains(&kw) {
            Ok(kw)
        } else {
            let names: Vec<String> = allowed.iter().map(|k| format!("'{k}'")).collect();
            Err(self.user_error(format!("Expected {} keyword", names.join(" or "))))
        }
    }

    fn expect_identifier(&self) -> Result<(), CompilerError> {
        if self.tokenizer.token_type() == TokenType::Identifier {
            Ok(())
        } else {
            Err(self.user_error("Expected an identifier"))
        }
    }

    /// `int`, `char`, `boolean`, a class name, or (when `void_allowed`) `void`.
    fn expect_type(&self, void_allowed: bool) -> Result<(), CompilerError> {
        match self.tokenizer.token_type() {
            TokenType::Keyword => {
                let kw = self.tokenizer.keyword().expect("checked token type");
                if kw.is_type_keyword(void_allowed) {
                    return Ok(());
                }
            }
            TokenType::Identifier => return Ok(()),
            _ => {}
        }
        let mut msg = "Expected type ('int', 'char', 'boolean'".to_string();
        if void_allowed {
            msg.push_str(", 'void'");
        }
        msg.push_str(" or class name)");
        Err(self.user_error(msg))
    }

    /// Captures the textual spelling of a type token (keyword or identifier).
    fn current_type_name(&self) -> String {
        if self.tokenizer.token_type() == TokenType::Keyword {
            self.tokenizer.keyword().expect("checked token type").to_string()
        } else {
            self.tokenizer
                .identifier()
                .expect("checked token type")
                .to_string()
        }
    }

    fn handle_symbol(&mut self, c: char) -> Result<(), CompilerError> {
        self.expect_symbol(c)?;
        self.advance_or_error()
    }

    fn handle_keyword(&mut self, kw: Keyword) -> Result<(), CompilerError> {
        self.expect_keyword(kw)?;
        self.advance_or_error()
    }

    fn new_label(&mut self) -> String {
        let label = format!("{}_{}", self.class_name, self.label_counter);
        self.label_counter += 1;
        label
    }

    fn define(&mut self, name: &str, type_name: &str, kind: Kind) -> Result<(), CompilerError> {
        self.symbols
            .define(name, type_name, kind)
            .map_err(|e| self.user_error(e))
    }

    // ---------- grammar ----------

    fn compile_class(&mut self) -> Result<(), CompilerError> {
        self.handle_keyword(Keyword::Class)?;

        self.expect_identifier()?;
        self.class_name = self.tokenizer.identifier().expect("checked token type").to_string();
        self.advance_or_error()?;

        self.handle_symbol('{')?;

        while self.is_keyword(Keyword::Field) || self.is_keyword(Keyword::Static) {
            self.compile_class_var_dec()?;
        }

        while self.is_keyword(Keyword::Constructor)
            || self.is_keyword(Keyword::Function)
            || self.is_keyword(Keyword::Method)
        {
            self.compile_subroutine()?;
        }

        self.expect_symbol('}')
        // no advance: compile() checks for trailing tokens after this point.
    }

    fn compile_class_var_dec(&mut self) -> Result<(), CompilerError> {
        let kind = if self.is_keyword(Keyword::Field) {
            Kind::Field
        } else {
            Kind::Static
        };
        self.advance_or_error()?;

        self.expect_type(false)?;
        let type_name = self.current_type_name();
        self.advance_or_error()?;

        self.expect_identifier()?;
        let name = self.tokenizer.identifier().expect("checked token type").to_string();
        self.define(&name, &type_name, kind)?;
        self.advance_or_error()?;

        while self.is_symbol(',') {
            self.handle_symbol(',')?;
            self.expect_identifier()?;
            let name = self.tokenizer.identifier().expect("checked token type").to_string();
            self.define(&name, &type_name, kind)?;
            self.advance_or_error()?;
        }

        self.handle_symbol(';')
    }

    fn compile_subroutine(&mut self) -> Result<(), CompilerError> {
        self.symbols.start_subroutine();

        let kw = self.expect_keyword_one_of(&[Keyword::Constructor, Keyword::Function, Keyword::Method])?;
        let subroutine_kind = match kw {
            Keyword::Constructor => SubroutineKind::Constructor,
            Keyword::Method => SubroutineKind::Method,
            _ => SubroutineKind::Function,
        };
        self.advance_or_error()?;

        self.expect_type(true)?;
        let is_void = self.is_keyword(Keyword::Void);
        self.advance_or_error()?;

        self.expect_identifier()?;
        let sub_name = self.tokenizer.identifier().expect("checked token type").to_string();
        self.advance_or_error()?;

        self.handle_symbol('(')?;

        if subroutine_kind == SubroutineKind::Method {
            let class_name = self.class_name.clone();
            self.define("this", &class_name, Kind::Arg)?;
        }

        self.compile_parameter_list()?;

        self.handle_symbol(')')?;
        self.handle_symbol('{')?;

        while self.is_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }

        self.writer
            .write_function(&format!("{}.{sub_name}", self.class_name), self.symbols.var_count(Kind::Var))?;

        match subroutine_kind {
            SubroutineKind::Method => {
                self.writer.write_push("argument", 0)?;
                self.writer.write_pop("pointer", 0)?;
            }
            SubroutineKind::Constructor => {
                self.writer
                    .write_push("constant", self.symbols.var_count(Kind::Field))?;
                self.writer.write_call("Memory.alloc", 1)?;
                self.writer.write_pop("pointer", 0)?;
            }
            SubroutineKind::Function => {}
        }

        self.current_subroutine_kind = subroutine_kind;
        self.current_subroutine_is_void = is_void;

        self.compile_statements()?;

        self.handle_symbol('}')
    }

    fn compile_parameter_list(&mut self) -> Result<(), CompilerError> {
        if self.is_symbol(')') {
            return Ok(());
        }

        self.expect_type(false)?;
        let mut type_name = self.current_type_name();
        self.advance_or_error()?;

        self.expect_identifier()?;
        let mut name = self.tokenizer.identifier().expect("checked token type").to_string();
        self.define(&name, &type_name, Kind::Arg)?;
        self.advance_or_error()?;

        while self.is_symbol(',') {
            self.handle_symbol(',')?;

            self.expect_type(false)?;
            type_name = self.current_type_name();
            self.advance_or_error()?;

            self.expect_identifier()?;
            name = self.tokenizer.identifier().expect("checked token type").to_string();
            self.define(&name, &type_name, Kind::Arg)?;
            self.advance_or_error()?;
        }

        Ok(())
    }

    fn compile_var_dec(&mut self) -> Result<(), CompilerError> {
        self.handle_keyword(Keyword::Var)?;

        self.expect_type(false)?;
        let type_name = self.current_type_name();
        self.advance_or_error()?;

        self.expect_identifier()?;
        let name = self.tokenizer.identifier().expect("checked token type").to_string();
        self.define(&name, &type_name, Kind::Var)?;
        self.advance_or_error()?;

        while self.is_symbol(',') {
            self.handle_symbol(',')?;
            self.expect_identifier()?;
            let name = self.tokenizer.identifier().expect("checked token type").to_string();
            self.define(&name, &type_name, Kind::Var)?;
            self.advance_or_error()?;
        }

        self.handle_symbol(';')
    }

    fn compile_statements(&mut self) -> Result<(), CompilerError> {
        loop {
            if self.is_symbol('}') {
                return Ok(());
            }
            if self.tokenizer.token_type() != TokenType::Keyword {
                return Err(self.user_error(
                    "Expected statement keyword ('let', 'if', 'while', 'do', 'return')",
                ));
            }
            match self.tokenizer.keyword().expect("checked token type") {
                Keyword::Let => self.compile_let()?,
                Keyword::If => self.compile_if()?,
                Keyword::While => self.compile_while()?,
                Keyword::Do => self.compile_do()?,
                Keyword::Return => self.compile_return()?,
                _ => {
                    return Err(self.user_error(
                        "Expected statement keyword ('let', 'if', 'while', 'do', 'return')",
                    ))
                }
            }
        }
    }

    fn compile_do(&mut self) -> Result<(), CompilerError> {
        self.handle_keyword(Keyword::Do)?;

        self.expect_identifier()?;
        let base_name = self.tokenizer.identifier().expect("checked token type").to_string();
        self.advance_or_error()?;

        self.compile_call(&base_name)?;

        self.writer.write_pop("temp", 0)?;
        self.handle_symbol(';')
    }

    /// Resolves and emits `base.sub(args)` or the unqualified `sub(args)`,
    /// assumed already positioned just past `base_name`.
    fn compile_call(&mut self, base_name: &str) -> Result<(), CompilerError> {
        if self.is_symbol('.') {
            self.handle_symbol('.')?;
            self.expect_identifier()?;
            let sub_name = self.tokenizer.identifier().expect("checked token type").to_string();
            self.advance_or_error()?;

            let (call_name, implicit_args) = if let Some(kind) = self.symbols.kind_of(base_name) {
                let index = self.symbols.index_of(base_name).expect("kind implies index");
                self.writer.write_push(kind.segment(), index)?;
                let var_type = self.symbols.type_of(base_name).expect("kind implies type").to_string();
                (format!("{var_type}.{sub_name}"), 1)
            } else {
                (format!("{base_name}.{sub_name}"), 0)
            };

            self.handle_symbol('(')?;
            let n_exprs = self.compile_expression_list()?;
            self.handle_symbol(')')?;

            self.writer.write_call(&call_name, implicit_args + n_exprs)
        } else {
            if self.current_subroutine_kind == SubroutineKind::Function {
                return Err(self.user_error(format!(
                    "Invalid unqualified call '{base_name}' inside a function; qualify with a class name or call a method via an object"
                )));
            }
            self.writer.write_push("pointer", 0)?;

            self.handle_symbol('(')?;
            let n_exprs = self.compile_expression_list()?;
            self.handle_symbol(')')?;

            let call_name = format!("{}.{base_name}", self.class_name);
            self.writer.write_call(&call_name, 1 + n_exprs)
        }
    }

    fn compile_let(&mut self) -> Result<(), CompilerError> {
        self.handle_keyword(Keyword::Let)?;

        self.expect_identifier()?;
        let name = self.tokenizer.identifier().expect("checked token type").to_string();
        let Some(kind) = self.symbols.kind_of(&name) else {
            return Err(self.user_error(format!("Undefined variable '{name}' in let statement")));
        };
        let index = self.symbols.index_of(&name).expect("kind implies index");
        let segment = kind.segment();
        self.advance_or_error()?;

        if self.is_symbol('[') {
            self.handle_symbol('[')?;
            self.writer.write_push(segment, index)?;
            self.compile_expression()?;
            self.handle_symbol(']')?;
            self.writer.write_arithmetic("add")?;

            self.handle_symbol('=')?;
            self.compile_expression()?;
            self.handle_symbol(';')?;

            self.writer.write_pop("temp", 0)?;
            self.writer.write_pop("pointer", 1)?;
            self.writer.write_push("temp", 0)?;
            self.writer.write_pop("that", 0)?;
            return Ok(());
        }

        self.handle_symbol('=')?;
        self.compile_expression()?;
        self.handle_symbol(';')?;
        self.writer.write_pop(segment, index)
    }

    fn compile_while(&mut self) -> Result<(), CompilerError> {
        self.handle_keyword(Keyword::While)?;
        self.handle_symbol('(')?;

        let label1 = self.new_label();
        let label2 = self.new_label();

        self.writer.write_label(&label1)?;
        self.compile_expression()?;
        self.writer.write_arithmetic("not")?;
        self.handle_symbol(')')?;

        self.writer.write_if(&label2)?;
        self.handle_symbol('{')?;
        self.compile_statements()?;
        self.writer.write_goto(&label1)?;
        self.handle_symbol('}')?;

        self.writer.write_label(&label2)
    }

    fn compile_return(&mut self) -> Result<(), CompilerError> {
        self.handle_keyword(Keyword::Return)?;

        if self.is_symbol(';') {
            if !self.current_subroutine_is_void {
                return Err(self.user_error("Expected expression after 'return'"));
            }
            self.writer.write_push("constant", 0)?;
        } else {
            if self.current_subroutine_is_void {
                return Err(self.user_error("void subroutine must not return a value"));
            }
            self.compile_expression()?;
        }

        self.writer.write_return()?;
        self.handle_symbol(';')
    }

    fn compile_if(&mut self) -> Result<(), CompilerError> {
        self.handle_keyword(Keyword::If)?;
        self.handle_symbol('(')?;

        self.compile_expression()?;
        self.writer.write_arithmetic("not")?;
        self.handle_symbol(')')?;

        let label1 = self.new_label();
        let label2 = self.new_label();

        self.writer.write_if(&label1)?;
        self.handle_symbol('{')?;
        self.compile_statements()?;
        self.writer.write_goto(&label2)?;
        self.handle_symbol('}')?;

        self.writer.write_label(&label1)?;

        if self.is_keyword(Keyword::Else) {
            self.handle_keyword(Keyword::Else)?;
            self.handle_symbol('{')?;
            self.compile_statements()?;
            self.handle_symbol('}')?;
        }

        self.writer.write_label(&label2)
    }

    fn compile_expression_list(&mut self) -> Result<u16, CompilerError> {
        if self.is_symbol(')') {
            return Ok(0);
        }

        let mut count: u16 = 0;
        loop {
            self.compile_expression()?;
            count += 1;
            if self.is_symbol(',') {
                self.handle_symbol(',')?;
            } else {
                break;
            }
        }
        Ok(count)
    }

    fn compile_expression(&mut self) -> Result<(), CompilerError> {
        self.compile_term()?;

        while self.is_operator() {
            let op = self.tokenizer.symbol().expect("checked token type");
            self.advance_or_error()?;
            self.compile_term()?;

            match op {
                '*' => self.writer.write_call("Math.multiply", 2)?,
                '/' => self.writer.write_call("Math.divide", 2)?,
                '+' => self.writer.write_arithmetic("add")?,
                '-' => self.writer.write_arithmetic("sub")?,
                '&' => self.writer.write_arithmetic("and")?,
                '|' => self.writer.write_arithmetic("or")?,
                '<' => self.writer.write_arithmetic("lt")?,
                '>' => self.writer.write_arithmetic("gt")?,
                '=' => self.writer.write_arithmetic("eq")?,
                _ => unreachable!("is_operator() only admits the above"),
            }
        }

        Ok(())
    }

    fn compile_term(&mut self) -> Result<(), CompilerError> {
        match self.tokenizer.token_type() {
            TokenType::IntConst => {
                let value = self.tokenizer.int_val().expect("checked token type");
                self.writer.write_push("constant", value as u16)?;
                self.advance_or_error()
            }
            TokenType::StringConst => {
                let s = self.tokenizer.string_val().expect("checked token type").to_string();
                self.writer.write_push("constant", s.len() as u16)?;
                self.writer.write_call("String.new", 1)?;
                for c in s.chars() {
                    self.writer.write_push("constant", c as u16)?;
                    self.writer.write_call("String.appendChar", 2)?;
                }
                self.advance_or_error()
            }
            TokenType::Keyword if self.tokenizer.keyword().expect("checked token type").is_constant_keyword() => {
                match self.tokenizer.keyword().expect("checked token type") {
                    Keyword::True => {
                        self.writer.write_push("constant", 1)?;
                        self.writer.write_arithmetic("neg")?;
                    }
                    Keyword::False | Keyword::Null => {
                        self.writer.write_push("constant", 0)?;
                    }
                    Keyword::This => {
                        self.writer.write_push("pointer", 0)?;
                    }
                    _ => unreachable!("is_constant_keyword() only admits the above"),
                }
                self.advance_or_error()
            }
            TokenType::Symbol if self.is_symbol('-') || self.is_symbol('~') => {
                let op = self.tokenizer.symbol().expect("checked token type");
                self.advance_or_error()?;
                self.compile_term()?;
                self.writer.write_arithmetic(if op == '-' { "neg" } else { "not" })
            }
            TokenType::Symbol if self.is_symbol('(') => {
                self.handle_symbol('(')?;
                self.compile_expression()?;
                self.handle_symbol(')')
            }
            TokenType::Identifier => {
                let base_name = self.tokenizer.identifier().expect("checked token type").to_string();
                self.advance_or_error()?;

                if self.is_symbol('.') || self.is_symbol('(') {
                    self.compile_call(&base_name)
                } else if self.is_symbol('[') {
                    let Some(kind) = self.symbols.kind_of(&base_name) else {
                        return Err(self.user_error(format!("Undefined variable '{base_name}'")));
                    };
                    let index = self.symbols.index_of(&base_name).expect("kind implies index");

                    self.handle_symbol('[')?;
                    self.writer.write_push(kind.segment(), index)?;
                    self.compile_expression()?;
                    self.handle_symbol(']')?;

                    self.writer.write_arithmetic("add")?;
                    self.writer.write_pop("pointer", 1)?;
                    self.writer.write_push("that", 0)
                } else {
                    let Some(kind) = self.symbols.kind_of(&base_name) else {
                        return Err(self.user_error(format!("Undefined variable '{base_name}'")));
                    };
                    let index = self.symbols.index_of(&base_name).expect("kind implies index");
                    self.writer.write_push(kind.segment(), index)
                }
            }
            _ => Err(self.user_error(
                "Expected an identifier, a keyword constant ('true', 'false', 'null', 'this'), \
                 an integer constant, a string constant, '(', '-' or '~'",
            )),
        }
    }
}
