//! End-to-end tests driving the translator through its public library API.

use vm_translator::{translate_unit, TranslationUnit};

fn unit(name: &str, lines: &[&str]) -> TranslationUnit {
    TranslationUnit {
        name: name.to_string(),
        source: lines.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn simple_add_pushes_both_operands_and_sums() {
    let asm = translate_unit(
        &[unit(
            "SimpleAdd.vm",
            &["push constant 7", "push constant 8", "add"],
        )],
        false,
    )
    .unwrap();

    assert!(asm.iter().any(|l| l == "@7"));
    assert!(asm.iter().any(|l| l == "@8"));
    assert!(asm.iter().any(|l| l == "D=D+M"));
}

#[test]
fn static_segment_is_namespaced_per_translation_unit() {
    let asm = translate_unit(
        &[
            unit("Foo.vm", &["push constant 1", "pop static 0"]),
            unit("Bar.vm", &["push constant 2", "pop static 0"]),
        ],
        false,
    )
    .unwrap();

    assert!(asm.iter().any(|l| l == "@Foo.0"));
    assert!(asm.iter().any(|l| l == "@Bar.0"));
}

#[test]
fn function_call_and_return_round_trip_through_the_vm_protocol() {
    let asm = translate_unit(
        &[unit(
            "Main.vm",
            &[
                "function Main.fib 0",
                "push argument 0",
                "return",
                "function Sys.init 0",
                "push constant 4",
                "call Main.fib 1",
                "return",
            ],
        )],
        false,
    )
    .unwrap();

    assert!(asm.iter().any(|l| l == "(Main.fib)"));
    assert!(asm.iter().any(|l| l == "(Sys.init)"));
    assert!(asm.iter().any(|l| l == "@Main.fib"));
    assert!(asm.iter().any(|l| l.starts_with("(Main.fib$ret.")));
}

#[test]
fn labels_are_scoped_per_function_across_multiple_calls() {
    let asm = translate_unit(
        &[unit(
            "Loop.vm",
            &[
                "function Main.loop 1",
                "label START",
                "goto START",
                "function Main.other 0",
                "label START",
                "if-goto START",
                "return",
            ],
        )],
        false,
    )
    .unwrap();

    assert!(asm.iter().any(|l| l == "(Main.loop$START)"));
    assert!(asm.iter().any(|l| l == "(Main.other$START)"));
}

#[test]
fn bootstrap_sets_the_stack_pointer_before_calling_sys_init() {
    let asm = translate_unit(
        &[unit("Sys.vm", &["function Sys.init 0", "return"])],
        true,
    )
    .unwrap();

    assert_eq!(asm[0], "// bootstrap");
    assert_eq!(asm[1], "@256");
    assert_eq!(asm[2], "D=A");
    assert!(asm.iter().any(|l| l == "@Sys.init"));
}

#[test]
fn unknown_segment_produces_a_located_diagnostic() {
    let err = translate_unit(&[unit("Bad.vm", &["push nowhere 0"])], false).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Error in file Bad.vm at line 0:"));
}

#[test]
fn malformed_index_is_reported_with_its_source_line() {
    let err = translate_unit(
        &[unit("Bad.vm", &["push constant 1", "push constant abc"])],
        false,
    )
    .unwrap_err();
    assert!(err.to_string().contains("at line 1"));
}
