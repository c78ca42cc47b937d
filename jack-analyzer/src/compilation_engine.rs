//! Recursive-descent grammar walk that emits an indented, escaped XML parse
//! tree instead of VM code. Shares the expect/handle helper split with
//! `jack-compiler`'s engine, but neither stage resolves symbols nor decides
//! segments; it only classifies and echoes tokens.

use std::io::{self, Write};

use jack_tokenizer::{Keyword, TokenType, Tokenizer};

use crate::error::AnalyzerError;

pub struct CompilationEngine<W: Write> {
    tokenizer: Tokenizer,
    output: W,
    file_name: String,
    indent: usize,
}

impl<W: Write> CompilationEngine<W> {
    pub fn new(file_name: &str, source: &[String], output: W) -> Result<Self, AnalyzerError> {
        let tokenizer = Tokenizer::new(file_name, source)?;
        Ok(CompilationEngine {
            tokenizer,
            output,
            file_name: file_name.to_string(),
            indent: 0,
        })
    }

    pub fn compile(mut self) -> Result<W, AnalyzerError> {
        self.advance_or_error()?;
        self.compile_class()?;

        if self.tokenizer.has_more_tokens() {
            return Err(self.user_error("Extra tokens after class declaration"));
        }

        Ok(self.output)
    }

    fn user_error(&self, message: impl Into<String>) -> AnalyzerError {
        AnalyzerError::user(&self.file_name, self.tokenizer.token_line_idx(), message)
    }

    fn advance_or_error(&mut self) -> Result<(), AnalyzerError> {
        if !self.tokenizer.has_more_tokens() {
            return Err(self.user_error("Unexpected EOF"));
        }
        self.tokenizer.advance();
        Ok(())
    }

    fn open(&mut self, tag: &str) -> io::Result<()> {
        writeln!(self.output, "{}<{tag}>", "  ".repeat(self.indent))?;
        self.indent += 1;
        Ok(())
    }

    fn close(&mut self, tag: &str) -> io::Result<()> {
        self.indent -= 1;
        writeln!(self.output, "{}</{tag}>", "  ".repeat(self.indent))
    }

    fn leaf(&mut self, tag: &str, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}<{tag}> {} </{tag}>", "  ".repeat(self.indent), xml_escape(text))
    }

    // ------- token predicates -------

    fn is_symbol(&self, c: char) -> bool {
        self.tokenizer.token_type() == TokenType::Symbol && self.tokenizer.symbol().expect("checked token type") == c
    }

    fn is_keyword(&self, kw: Keyword) -> bool {
        self.tokenizer.token_type() == TokenType::Keyword && self.tokenizer.keyword().expect("checked token type") == kw
    }

    fn is_operator(&self) -> bool {
        self.tokenizer.token_type() == TokenType::Symbol
            && "+-*/&|<>=".contains(self.tokenizer.symbol().expect("checked token type"))
    }

    // ------- expect helpers -------

    fn expect_symbol(&self, c: char) -> Result<(), AnalyzerError> {
        if !self.is_symbol(c) {
            return Err(self.user_error(format!("Expected '{c}' symbol")));
        }
        Ok(())
    }

    fn expect_keyword(&self, kw: Keyword) -> Result<(), AnalyzerError> {
        if !self.is_keyword(kw) {
            return Err(self.user_error(format!("Expected '{kw}' keyword")));
        }
        Ok(())
    }

    fn expect_keyword_one_of(&self, allowed: &[Keyword]) -> Result<(), AnalyzerError> {
        if self.tokenizer.token_type() != TokenType::Keyword
            || !allowed.contains(&self.tokenizer.keyword().expect("checked token type"))
        {
            let names: Vec<String> = allowed.iter().map(|k| format!("'{k}'")).collect();
            return Err(self.user_error(format!("Expected {} keyword", names.join(" or "))));
        }
        Ok(())
    }

    fn expect_identifier(&self) -> Result<(), AnalyzerError> {
        if self.tokenizer.token_type() != TokenType::Identifier {
            return Err(self.user_error("Expected identifier"));
        }
        Ok(())
    }

    fn expect_type(&self, void_allowed: bool) -> Result<(), AnalyzerError> {
        match self.tokenizer.token_type() {
            TokenType::Keyword if self.tokenizer.keyword().expect("checked token type").is_type_keyword(void_allowed) => Ok(()),
            TokenType::Identifier => Ok(()),
            _ => {
                let mut msg = String::from("Expected type ('int', 'char', 'boolean'");
                if void_allowed {
                    msg.push_str(", 'void'");
                }
                msg.push_str(" or class name)");
                Err(self.user_error(msg))
            }
        }
    }

    // ------- handle helpers (expect + emit + advance) -------

    fn handle_symbol(&mut self, c: char) -> Result<(), AnalyzerError> {
        self.expect_symbol(c)?;
        self.leaf("symbol", &c.to_string())?;
        self.advance_or_error()
    }

    fn handle_keyword(&mut self, kw: Keyword) -> Result<(), AnalyzerError> {
        self.expect_keyword(kw)?;
        self.leaf("keyword", &kw.to_string())?;
        self.advance_or_error()
    }

    fn handle_keyword_one_of(&mut self, allowed: &[Keyword]) -> Result<(), AnalyzerError> {
        self.expect_keyword_one_of(allowed)?;
        let kw = self.tokenizer.keyword().expect("checked token type");
        self.leaf("keyword", &kw.to_string())?;
        self.advance_or_error()
    }

    fn handle_identifier(&mut self) -> Result<(), AnalyzerError> {
        self.expect_identifier()?;
        let name = self.tokenizer.identifier().expect("checked token type").to_string();
        self.leaf("identifier", &name)?;
        self.advance_or_error()
    }

    fn handle_type(&mut self, void_allowed: bool) -> Result<(), AnalyzerError> {
        self.expect_type(void_allowed)?;
        if self.tokenizer.token_type() == TokenType::Keyword {
            let kw = self.tokenizer.keyword().expect("checked token type");
            self.leaf("keyword", &kw.to_string())?;
        } else {
            let name = self.tokenizer.identifier().expect("checked token type").to_string();
            self.leaf("identifier", &name)?;
        }
        self.advance_or_error()
    }

    // ------- grammar -------

    fn compile_class(&mut self) -> Result<(), AnalyzerError> {
        self.open("class")?;

        self.handle_keyword(Keyword::Class)?;
        self.handle_identifier()?;
        self.handle_symbol('{')?;

        while self.is_keyword(Keyword::Field) || self.is_keyword(Keyword::Static) {
            self.compile_class_var_dec()?;
        }

        while self.is_keyword(Keyword::Constructor) || self.is_keyword(Keyword::Function) || self.is_keyword(Keyword::Method) {
            self.compile_subroutine()?;
        }

        self.handle_symbol('}')?;
        self.close("class")?;
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> Result<(), AnalyzerError> {
        self.open("classVarDec")?;

        self.handle_keyword_one_of(&[Keyword::Field, Keyword::Static])?;
        self.handle_type(false)?;
        self.handle_identifier()?;

        while self.is_symbol(',') {
            self.handle_symbol(',')?;
            self.handle_identifier()?;
        }

        self.handle_symbol(';')?;
        self.close("classVarDec")?;
        Ok(())
    }

    fn compile_subroutine(&mut self) -> Result<(), AnalyzerError> {
        self.open("subroutineDec")?;

        self.handle_keyword_one_of(&[Keyword::Constructor, Keyword::Function, Keyword::Method])?;
        self.handle_type(true)?;
        self.handle_identifier()?;
        self.handle_symbol('(')?;

        self.compile_parameter_list()?;

        self.handle_symbol(')')?;

        self.open("subroutineBody")?;
        self.handle_symbol('{')?;

        while self.is_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }

        self.compile_statements()?;

        self.handle_symbol('}')?;
        self.close("subroutineBody")?;
        self.close("subroutineDec")?;
        Ok(())
    }

    fn compile_parameter_list(&mut self) -> Result<(), AnalyzerError> {
        self.open("parameterList")?;

        if self.is_symbol(')') {
            self.close("parameterList")?;
            return Ok(());
        }

        self.handle_type(false)?;
        self.handle_identifier()?;

        while self.is_symbol(',') {
            self.handle_symbol(',')?;
            self.handle_type(false)?;
            self.handle_identifier()?;
        }

        self.close("parameterList")?;
        Ok(())
    }

    fn compile_var_dec(&mut self) -> Result<(), AnalyzerError> {
        self.open("varDec")?;

        self.handle_keyword(Keyword::Var)?;
        self.handle_type(false)?;
        self.handle_identifier()?;

        while self.is_symbol(',') {
            self.handle_symbol(',')?;
            self.handle_identifier()?;
        }

        self.handle_symbol(';')?;
        self.close("varDec")?;
        Ok(())
    }

    fn compile_statements(&mut self) -> Result<(), AnalyzerError> {
        self.open("statements")?;

        if self.tokenizer.token_type() != TokenType::Keyword && !self.is_symbol('}') {
            return Err(self.user_error("Expected statement keyword ('let', 'if', 'while', 'do', 'return')"));
        }

        while self.tokenizer.token_type() == TokenType::Keyword {
            match self.tokenizer.keyword().expect("checked token type") {
                Keyword::Let => self.compile_let()?,
                Keyword::If => self.compile_if()?,
                Keyword::While => self.compile_while()?,
                Keyword::Do => self.compile_do()?,
                Keyword::Return => self.compile_return()?,
                _ => return Err(self.user_error("Expected statement keyword ('let', 'if', 'while', 'do', 'return')")),
            }
        }

        self.close("statements")?;
        Ok(())
    }

    fn compile_do(&mut self) -> Result<(), AnalyzerError> {
        self.open("doStatement")?;

        self.handle_keyword(Keyword::Do)?;
        self.handle_identifier()?;

        if self.is_symbol('.') {
            self.handle_symbol('.')?;
            self.handle_identifier()?;
        }

        self.handle_symbol('(')?;
        self.compile_expression_list()?;
        self.handle_symbol(')')?;
        self.handle_symbol(';')?;

        self.close("doStatement")?;
        Ok(())
    }

    fn compile_let(&mut self) -> Result<(), AnalyzerError> {
        self.open("letStatement")?;

        self.handle_keyword(Keyword::Let)?;
        self.handle_identifier()?;

        if self.is_symbol('[') {
            self.handle_symbol('[')?;
            self.compile_expression()?;
            self.handle_symbol(']')?;
        }

        self.handle_symbol('=')?;
        self.compile_expression()?;
        self.handle_symbol(';')?;

        self.close("letStatement")?;
        Ok(())
    }

    fn compile_while(&mut self) -> Result<(), AnalyzerError> {
        self.open("whileStatement")?;

        self.handle_keyword(Keyword::While)?;
        self.handle_symbol('(')?;
        self.compile_expression()?;
        self.handle_symbol(')')?;
        self.handle_symbol('{')?;
        self.compile_statements()?;
        self.handle_symbol('}')?;

        self.close("whileStatement")?;
        Ok(())
    }

    fn compile_return(&mut self) -> Result<(), AnalyzerError> {
        self.open("returnStatement")?;

        self.handle_keyword(Keyword::Return)?;

        if !self.is_symbol(';') {
            self.compile_expression()?;
        }

        self.handle_symbol(';')?;

        self.close("returnStatement")?;
        Ok(())
    }

    fn compile_if(&mut self) -> Result<(), AnalyzerError> {
        self.open("ifStatement")?;

        self.handle_keyword(Keyword::If)?;
        self.handle_symbol('(')?;
        self.compile_expression()?;
        self.handle_symbol(')')?;
        self.handle_symbol('{')?;
        self.compile_statements()?;
        self.handle_symbol('}')?;

        if self.is_keyword(Keyword::Else) {
            self.handle_keyword(Keyword::Else)?;
            self.handle_symbol('{')?;
            self.compile_statements()?;
            self.handle_symbol('}')?;
        }

        self.close("ifStatement")?;
        Ok(())
    }

    fn compile_expression_list(&mut self) -> Result<(), AnalyzerError> {
        self.open("expressionList")?;

        if self.is_symbol(')') {
            self.close("expressionList")?;
            return Ok(());
        }

        self.compile_expression()?;

        while self.is_symbol(',') {
            self.handle_symbol(',')?;
            self.compile_expression()?;
        }

        self.close("expressionList")?;
        Ok(())
    }

    fn compile_expression(&mut self) -> Result<(), AnalyzerError> {
        self.open("expression")?;

        self.compile_term()?;

        while self.is_operator() {
            let op = self.tokenizer.symbol().expect("checked token type");
            self.handle_symbol(op)?;
            self.compile_term()?;
        }

        self.close("expression")?;
        Ok(())
    }

    fn compile_term(&mut self) -> Result<(), AnalyzerError> {
        self.open("term")?;

        match self.tokenizer.token_type() {
            TokenType::IntConst => {
                let value = self.tokenizer.int_val().expect("checked token type");
                self.leaf("integerConstant", &value.to_string())?;
                self.advance_or_error()?;
            }
            TokenType::StringConst => {
                let s = self.tokenizer.string_val().expect("checked token type").to_string();
                self.leaf("stringConstant", &s)?;
                self.advance_or_error()?;
            }
            TokenType::Keyword
                if self.tokenizer.keyword().expect("checked token type").is_constant_keyword() =>
            {
                self.handle_keyword_one_of(&[Keyword::True, Keyword::False, Keyword::Null, Keyword::This])?;
            }
            TokenType::Symbol if self.is_symbol('(') => {
                self.handle_symbol('(')?;
                self.compile_expression()?;
                self.handle_symbol(')')?;
            }
            TokenType::Symbol if self.is_symbol('-') || self.is_symbol('~') => {
                let op = self.tokenizer.symbol().expect("checked token type");
                self.handle_symbol(op)?;
                self.compile_term()?;
            }
            TokenType::Identifier => {
                self.handle_identifier()?;

                if self.is_symbol('[') {
                    self.handle_symbol('[')?;
                    self.compile_expression()?;
                    self.handle_symbol(']')?;
                } else if self.is_symbol('.') {
                    self.handle_symbol('.')?;
                    self.handle_identifier()?;
                    self.handle_symbol('(')?;
                    self.compile_expression_list()?;
                    self.handle_symbol(')')?;
                } else if self.is_symbol('(') {
                    self.handle_symbol('(')?;
                    self.compile_expression_list()?;
                    self.handle_symbol(')')?;
                }
            }
            _ => return Err(self.user_error("Expected a term")),
        }

        self.close("term")?;
        Ok(())
    }
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
