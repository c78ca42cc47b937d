use jack_tokenizer::{Keyword, TokenType, Tokenizer};

fn src(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

#[test]
fn lexes_a_full_subroutine() {
    let source = src(&[
        "class Main {",
        "    function void main() {",
        "        var int x;",
        "        let x = 1 + 2;",
        "        do Output.printInt(x);",
        "        return;",
        "    }",
        "}",
    ]);

    let mut t = Tokenizer::new("Main.jack", &source).unwrap();
    let mut keywords = Vec::new();
    while t.has_more_tokens() {
        t.advance();
        if t.token_type() == TokenType::Keyword {
            keywords.push(t.keyword().unwrap());
        }
    }

    assert_eq!(
        keywords,
        vec![
            Keyword::Class,
            Keyword::Function,
            Keyword::Void,
            Keyword::Var,
            Keyword::Int,
            Keyword::Let,
            Keyword::Do,
            Keyword::Return,
        ]
    );
}

#[test]
fn reports_located_lex_errors() {
    let source = src(&["let x = \"unterminated"]);
    let err = Tokenizer::new("Broken.jack", &source).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Broken.jack"));
    assert!(message.contains("at line 0"));
}

#[test]
fn symbol_and_identifier_tokens_are_distinguished() {
    let source = src(&["x.y(1, 2)"]);
    let mut t = Tokenizer::new("Call.jack", &source).unwrap();

    let expected = [
        TokenType::Identifier,
        TokenType::Symbol,
        TokenType::Identifier,
        TokenType::Symbol,
        TokenType::IntConst,
        TokenType::Symbol,
        TokenType::IntConst,
        TokenType::Symbol,
    ];
    for kind in expected {
        assert!(t.has_more_tokens());
        t.advance();
        assert_eq!(t.token_type(), kind);
    }
    assert!(!t.has_more_tokens());
}
