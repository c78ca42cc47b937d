//! End-to-end tests driving the assembler through its public library API.

use hack_assembler::{assemble, AssemblerError};

#[test]
fn add_program_produces_expected_binary() {
    let lines: Vec<String> = [
        "// Computes R0 = 2 + 3",
        "@2",
        "D=A",
        "@3",
        "D=D+A",
        "@0",
        "M=D",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let hack = assemble("Add.asm", &lines).unwrap();
    assert_eq!(
        hack,
        vec![
            "0000000000000010",
            "1110110000010000",
            "0000000000000011",
            "1110000010010000",
            "0000000000000000",
            "1110001100001000",
        ]
    );
    assert!(hack.iter().all(|line| line.len() == 16));
}

#[test]
fn loop_with_label_and_variable() {
    let lines: Vec<String> = [
        "@i",
        "M=0",
        "(LOOP)",
        "@i",
        "D=M",
        "@10",
        "D=D-A",
        "@END",
        "D;JGE",
        "@i",
        "M=M+1",
        "@LOOP",
        "0;JMP",
        "(END)",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let hack = assemble("Loop.asm", &lines).unwrap();
    // 12 real instructions: the two labels contribute no code
    assert_eq!(hack.len(), 12);
    // The forward reference to (END) must resolve to the instruction right
    // after the label, i.e. index 12 in ROM (0-based), encoded as @12.
    assert_eq!(hack[6], hack_assembler::code::encode_a_instruction(12));
}

#[test]
fn ascii_digit_only_binary_output() {
    let lines = vec!["@16384".to_string(), "M=0".to_string()];
    let hack = assemble("Fill.asm", &lines).unwrap();
    for line in &hack {
        assert!(line.chars().all(|c| c == '0' || c == '1'));
        assert_eq!(line.len(), 16);
    }
}

#[test]
fn diagnostic_format_matches_contract() {
    let lines = vec!["@99999".to_string()];
    let err = assemble("Bad.asm", &lines).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Error in file Bad.asm at line 0:"));
    assert!(matches!(err, AssemblerError::User { .. }));
}
