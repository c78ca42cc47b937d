//! The two-pass assembler driver: ties together [`parser`](crate::parser),
//! [`symbol_table`](crate::symbol_table) and [`code`](crate::code) into the
//! `.asm` -> `.hack` transformation described in the Hack assembler component.

use crate::code;
use crate::error::AssemblerError;
use crate::parser::{CommandType, ParserLines};
use crate::symbol_table::SymbolTable;

const MAX_ADDRESS: u32 = (1 << 15) - 1;

/// Checks the `[A-Za-z_.$:][A-Za-z0-9_.$:]*` shape required of a non-numeric
/// `@symbol` or `(label)` name.
fn is_valid_symbol_name(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let is_head = |c: char| c.is_ascii_alphabetic() || matches!(c, '_' | '.' | '$' | ':');
    let is_tail = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':');
    is_head(first) && chars.all(is_tail)
}

/// Parses the address operand of an A-instruction: a decimal literal in
/// `0..=32767`, or a symbol name resolved/allocated through `symbols`.
fn resolve_address(
    file: &str,
    line: usize,
    symbol: &str,
    symbols: &mut SymbolTable,
    next_variable: &mut u16,
) -> Result<u16, AssemblerError> {
    if symbol.bytes().all(|b| b.is_ascii_digit()) {
        let value: u32 = symbol
            .parse()
            .map_err(|_| AssemblerError::user(file, line, format!("Invalid literal '{symbol}'")))?;
        if value > MAX_ADDRESS {
            return Err(AssemblerError::user(
                file,
                line,
                format!("Address literal {value} exceeds 15-bit range"),
            ));
        }
        return Ok(value as u16);
    }

    if !is_valid_symbol_name(symbol) {
        return Err(AssemblerError::user(
            file,
            line,
            format!("Invalid symbol name '{symbol}'"),
        ));
    }

    Ok(symbols.get_or_insert(symbol, next_variable))
}

/// Rejects a C-instruction whose dest/comp/jump mnemonics are not among the
/// ones `code` knows how to encode. An unrecognized mnemonic is a fatal
/// assembly error, not a fallback to "computes 0".
fn validate_c_instruction(
    file: &str,
    line: usize,
    dest: &str,
    comp: &str,
    jump: &str,
) -> Result<(), AssemblerError> {
    let (dest_valid, comp_valid, jump_valid) = code::validate_mnemonics(dest, comp, jump);
    if !comp_valid {
        return Err(AssemblerError::user(
            file,
            line,
            format!("Invalid comp mnemonic '{comp}'"),
        ));
    }
    if !dest_valid {
        return Err(AssemblerError::user(
            file,
            line,
            format!("Invalid dest mnemonic '{dest}'"),
        ));
    }
    if !jump_valid {
        return Err(AssemblerError::user(
            file,
            line,
            format!("Invalid jump mnemonic '{jump}'"),
        ));
    }
    Ok(())
}

/// First pass: records every label's ROM address. Labels do not occupy an
/// instruction slot, so only A/C-commands advance `rom_address`.
fn first_pass(
    file: &str,
    lines: &[String],
    symbols: &mut SymbolTable,
) -> Result<(), AssemblerError> {
    let mut rom_address: u16 = 0;
    let mut parser = ParserLines::from_lines(lines);

    while parser.advance() {
        match parser
            .command_type()
            .expect("advance() guarantees a current command")
        {
            CommandType::LCommand => {
                let label = parser.symbol().expect("L-command always has a symbol");
                if !is_valid_symbol_name(label) {
                    return Err(AssemblerError::user(
                        file,
                        parser.line_idx(),
                        format!("Invalid label name '{label}'"),
                    ));
                }
                if symbols.contains(label) {
                    return Err(AssemblerError::user(
                        file,
                        parser.line_idx(),
                        format!("Duplicate label '{label}'"),
                    ));
                }
                symbols.add_entry(label, rom_address);
            }
            CommandType::ACommand | CommandType::CCommand => {
                rom_address += 1;
            }
        }
    }

    Ok(())
}

/// Second pass: resolves every A-command operand and encodes every
/// instruction, returning one 16-character binary string per line.
fn second_pass(
    file: &str,
    lines: &[String],
    symbols: &mut SymbolTable,
) -> Result<Vec<String>, AssemblerError> {
    let mut next_variable: u16 = 16;
    let mut output = Vec::with_capacity(lines.len());
    let mut parser = ParserLines::from_lines(lines);

    while parser.advance() {
        match parser
            .command_type()
            .expect("advance() guarantees a current command")
        {
            CommandType::ACommand => {
                let symbol = parser.symbol().expect("A-command always has a symbol");
                let address = resolve_address(
                    file,
                    parser.line_idx(),
                    symbol,
                    symbols,
                    &mut next_variable,
                )?;
                output.push(code::encode_a_instruction(address));
            }
            CommandType::CCommand => {
                let dest = parser.dest().expect("C-command dest").unwrap_or("");
                let comp = parser.comp().expect("C-command comp").unwrap_or("");
                let jump = parser.jump().expect("C-command jump").unwrap_or("");
                validate_c_instruction(file, parser.line_idx(), dest, comp, jump)?;
                output.push(code::encode_c_instruction(dest, comp, jump));
            }
            CommandType::LCommand => {}
        }
    }

    Ok(output)
}

/// Runs both passes and returns the `.hack` output, one instruction per line.
///
/// `file` names the source for diagnostics (see [`AssemblerError`]); `lines`
/// are the raw `.asm` source lines, comments and blanks included.
pub fn assemble(file: &str, lines: &[String]) -> Result<Vec<String>, AssemblerError> {
    let mut symbols = SymbolTable::new();
    first_pass(file, lines, &mut symbols)?;
    second_pass(file, lines, &mut symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_push_scenario() {
        let lines = vec!["@7".to_string()];
        let out = assemble("t.asm", &lines).unwrap();
        assert_eq!(out, vec!["0000000000000111"]);
    }

    #[test]
    fn variable_allocation_reuses_address() {
        let lines = vec!["@i".to_string(), "@j".to_string(), "@i".to_string()];
        let out = assemble("t.asm", &lines).unwrap();
        assert_eq!(out[0], out[2]);
        assert_eq!(out[0], code::encode_a_instruction(16));
        assert_eq!(out[1], code::encode_a_instruction(17));
    }

    #[test]
    fn label_resolves_to_following_instruction() {
        let lines = vec![
            "(LOOP)".to_string(),
            "@LOOP".to_string(),
            "0;JMP".to_string(),
        ];
        let out = assemble("t.asm", &lines).unwrap();
        assert_eq!(out[0], code::encode_a_instruction(0));
    }

    #[test]
    fn duplicate_label_is_an_error() {
        let lines = vec![
            "(LOOP)".to_string(),
            "@0".to_string(),
            "(LOOP)".to_string(),
        ];
        let err = assemble("t.asm", &lines).unwrap_err();
        assert!(matches!(err, AssemblerError::User { .. }));
    }

    #[test]
    fn out_of_range_literal_is_an_error() {
        let lines = vec!["@32768".to_string()];
        let err = assemble("t.asm", &lines).unwrap_err();
        assert!(matches!(err, AssemblerError::User { .. }));
    }

    #[test]
    fn invalid_symbol_syntax_is_an_error() {
        let lines = vec!["@1abc".to_string()];
        let err = assemble("t.asm", &lines).unwrap_err();
        assert!(matches!(err, AssemblerError::User { .. }));
    }

    #[test]
    fn illegal_comp_mnemonic_is_an_error() {
        let lines = vec!["D=D+Q".to_string()];
        let err = assemble("t.asm", &lines).unwrap_err();
        assert!(matches!(err, AssemblerError::User { .. }));
    }

    #[test]
    fn illegal_jump_mnemonic_is_an_error() {
        let lines = vec!["AMD=M;JXX".to_string()];
        let err = assemble("t.asm", &lines).unwrap_err();
        assert!(matches!(err, AssemblerError::User { .. }));
    }

    #[test]
    fn round_trip_all_fifteen_bit_addresses_sample() {
        for n in [0u16, 1, 100, 16384, 32767] {
            let encoded = code::encode_a_instruction(n);
            let decoded = u16::from_str_radix(&encoded[1..], 2).unwrap();
            assert_eq!(decoded, n);
        }
    }
}
