mod common;

use cxx_analyzer::config::DialectConfig;
use cxx_analyzer::pp::{InMemoryIncludes, NoIncludes, Preprocessor, normalize, preprocess};
use cxx_analyzer::syntax::ast::AstNode;
use cxx_analyzer::syntax::kind::SyntaxKind;
use cxx_analyzer::{ErrorKind, parse_file, parse_text};

use crate::common::macro_chain;

#[test]
fn normalization_is_idempotent() {
    let inputs = [
        "??=define ARR(x) x??(0??)\nARR(a)\n",
        "int a = 1; ??/\n int b;",
        "\"??=\" '??/'' ??!??! ??-",
        "<: :> <% %> %: %:%:",
        "plain text without sequences",
        "??",
        "",
    ];
    for input in inputs {
        let once = normalize(input);
        let twice = normalize(&once.text);
        assert_eq!(twice.text, once.text, "normalizing {input:?} twice changed it");
    }
}

#[test]
fn recursive_macros_stop_expanding() {
    let direct = preprocess("#define foo foo + 1\nfoo\n", &DialectConfig::default());
    assert_eq!(direct.text(), "foo + 1");
    assert!(direct.tokens[0].painted);

    let mutual = preprocess("#define ping pong\n#define pong ping\nping pong\n", &DialectConfig::default());
    assert_eq!(mutual.text(), "ping pong");
    assert!(mutual.diagnostics.is_empty());
}

#[test]
fn nested_macro_chain_expands_to_a_hundred_thousand_tokens() {
    let output = preprocess(&macro_chain(5), &DialectConfig::default());
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.tokens.len(), 100_000);
    assert!(output.tokens.iter().all(|token| token.is_ident("a")));
}

#[test]
fn headers_and_their_macros_reach_the_parser() {
    let includes = InMemoryIncludes::new()
        .with_file("config.h", "#pragma once\n#define CAPACITY 16\n")
        .with_file("buffer.h", "#include \"config.h\"\nstruct Buffer { char data[CAPACITY]; };\n");
    let text = "#include \"buffer.h\"\n#include \"config.h\"\nstruct Buffer global;\n";
    let parse = parse_file(
        "main.c",
        text,
        &DialectConfig::c(),
        &cxx_analyzer::config::ParseLimits::default(),
        &includes,
    )
    .unwrap();
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    assert_eq!(parse.sources().len(), 3);
    assert!(parse.macros().contains("CAPACITY"));
    assert_eq!(parse.tree().unwrap().declarations().count(), 2);
}

#[test]
fn strict_failures_carry_their_error_kind() {
    let strict = DialectConfig::cpp().strict();
    let cases = [
        ("int a = 'x;\n", ErrorKind::Lex),
        ("#error stop here\nint a;\n", ErrorKind::Preprocessor),
        ("int a = ;\n", ErrorKind::Syntax),
        ("void f() { a b c; }\n", ErrorKind::AmbiguityExhausted),
    ];
    for (text, kind) in cases {
        let failure = parse_text(text, &strict).unwrap_err();
        assert_eq!(failure.kind(), kind, "{text:?}");
        assert!(failure.to_string().starts_with("FAILURE: "));
    }
}

#[test]
fn tolerant_parse_keeps_going_after_preprocessor_errors() {
    let output = Preprocessor::new("main.c", "#include <missing.h>\nint a;\n", &DialectConfig::c(), &NoIncludes).run();
    assert!(output.has_errors());
    assert_eq!(output.text(), "int a;");

    let parse = parse_text("#include <missing.h>\nint a;\n", &DialectConfig::c()).unwrap();
    assert!(parse.has_errors());
    let kinds: Vec<SyntaxKind> = parse.tree().unwrap().declarations().map(|decl| decl.syntax().kind()).collect();
    assert_eq!(kinds, vec![SyntaxKind::ProblemDeclaration, SyntaxKind::SimpleDeclaration]);
}
