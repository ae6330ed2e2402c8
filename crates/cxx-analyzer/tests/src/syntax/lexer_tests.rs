use super::*;

fn lex(input: &str) -> Vec<(SyntaxKind, &str)> {
    Lexer::new(input).map(|token| (token.kind, token.text)).collect()
}

#[test]
fn test_keywords_are_identifiers() {
    let input = "class void return";
    let tokens = lex(input);
    assert_eq!(
        tokens,
        vec![
            (SyntaxKind::Ident, "class"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Ident, "void"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Ident, "return"),
        ]
    );
}

#[test]
fn test_punctuation() {
    let input = "{ } ( ) ;";
    let tokens = lex(input);
    assert_eq!(
        tokens,
        vec![
            (SyntaxKind::LBrace, "{"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::RBrace, "}"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::LParen, "("),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::RParen, ")"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Semicolon, ";"),
        ]
    );
}

#[test]
fn test_identifiers_and_literals() {
    let input = "main 123 3.14 0x1p3 \"hello\" L'x'";
    let tokens = lex(input);
    assert_eq!(
        tokens,
        vec![
            (SyntaxKind::Ident, "main"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Integer, "123"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Float, "3.14"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Float, "0x1p3"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::String, "\"hello\""),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Char, "L'x'"),
        ]
    );
}

#[test]
fn test_newlines_and_line_splices() {
    let input = "#define A \\\n  1\nA";
    let kinds: Vec<_> = lex(input).into_iter().map(|(kind, _)| kind).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::Hash,
            SyntaxKind::Ident,
            SyntaxKind::Whitespace,
            SyntaxKind::Ident,
            SyntaxKind::Whitespace,
            SyntaxKind::Integer,
            SyntaxKind::Newline,
            SyntaxKind::Ident,
        ]
    );
}

#[test]
fn test_member_pointer_operators() {
    let input = "a.*pm b->*pm A::*";
    let kinds: Vec<_> = lex(input).into_iter().map(|(kind, _)| kind).filter(|kind| !kind.is_trivia()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::Ident,
            SyntaxKind::DotStar,
            SyntaxKind::Ident,
            SyntaxKind::Ident,
            SyntaxKind::ArrowStar,
            SyntaxKind::Ident,
            SyntaxKind::Ident,
            SyntaxKind::DoubleColon,
            SyntaxKind::Star,
        ]
    );
}

#[test]
fn test_operators() {
    let input = "a <<= 1 && b >= 2 <? c";
    let tokens = lex(input);
    assert_eq!(
        tokens,
        vec![
            (SyntaxKind::Ident, "a"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::LeftShiftEqual, "<<="),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Integer, "1"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::AndAnd, "&&"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Ident, "b"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::GreaterEqual, ">="),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Integer, "2"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Min, "<?"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Ident, "c"),
        ]
    );
}

#[test]
fn test_raw_string() {
    let input = r#"R"x(a ")" b)x" z"#;
    let tokens = lex(input);
    assert_eq!(tokens[0], (SyntaxKind::String, r#"R"x(a ")" b)x""#));
    assert_eq!(tokens.last(), Some(&(SyntaxKind::Ident, "z")));
}

#[test]
fn test_unterminated_string_is_an_error() {
    let tokens: Vec<_> = Lexer::new("char *s = \"abc;\nint x;").collect();
    let error = tokens.iter().find(|token| token.kind == SyntaxKind::Error).unwrap();
    assert_eq!(error.text, "\"abc;");
    assert_eq!(error.error, Some("unterminated string literal"));
    assert!(tokens.iter().any(|token| token.text == "int"));
}

#[test]
fn test_lex_single() {
    assert_eq!(lex_single("ab"), Some(SyntaxKind::Ident));
    assert_eq!(lex_single("+="), Some(SyntaxKind::PlusEqual));
    assert_eq!(lex_single("+-"), None);
    assert_eq!(lex_single("/"), Some(SyntaxKind::Slash));
}
