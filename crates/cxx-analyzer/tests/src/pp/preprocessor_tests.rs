use expect_test::expect;

use super::*;

fn run(text: &str) -> Preprocessed {
    preprocess(text, &DialectConfig::default())
}

fn run_with(
    text: &str,
    includes: &InMemoryIncludes,
) -> Preprocessed {
    Preprocessor::new("main.c", text, &DialectConfig::default(), includes).run()
}

fn messages(output: &Preprocessed) -> Vec<String> {
    output.diagnostics.iter().map(|diagnostic| diagnostic.message.clone()).collect()
}

#[test]
fn expands_object_like_macros() {
    let output = run("#define A 1 + 2\nint x = A;\n");
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.text(), "int x = 1 + 2;");
}

#[test]
fn expands_function_like_macros() {
    let output = run("#define MAX(a, b) ((a) > (b) ? (a) : (b))\nMAX(x, y + 1)\n");
    expect![[r#"((x) > (y + 1) ? (x) : (y + 1))"#]].assert_eq(&output.text());
}

#[test]
fn function_like_name_without_call_is_left_alone() {
    let output = run("#define f(x) x\nint f;\n");
    assert_eq!(output.text(), "int f;");
}

#[test]
fn stringizes_arguments() {
    let output = run("#define S(x) #x\nS(a  +  \"b\")\n");
    assert_eq!(output.text(), r#""a + \"b\"""#);
}

#[test]
fn pastes_tokens() {
    let output = run("#define CAT(a, b) a ## b\nCAT(foo, bar) CAT(1, 2)\n");
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.text(), "foobar 12");
    assert_eq!(output.tokens[0].kind, SyntaxKind::Ident);
    assert_eq!(output.tokens[1].kind, SyntaxKind::Integer);
}

#[test]
fn invalid_paste_reports_and_keeps_both_tokens() {
    let output = run("#define CAT(a, b) a ## b\nCAT(+, -)\n");
    assert!(output.has_errors());
    assert!(messages(&output)[0].starts_with("pasting \"+\" and \"-\""));
    assert_eq!(output.tokens.len(), 2);
}

#[test]
fn self_referencing_macro_terminates() {
    let output = run("#define foo foo\nfoo\n");
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.text(), "foo");
    assert!(output.tokens[0].painted);
}

#[test]
fn mutually_recursive_macros_terminate() {
    let output = run("#define a b\n#define b a\na b\n");
    assert_eq!(output.text(), "a b");
}

#[test]
fn rescanning_continues_past_the_end_of_a_replacement() {
    let output = run("#define f(a) a*g\n#define g(a) f(a)\nf(2)(9)\n");
    assert_eq!(output.text(), "2*9*g");
}

#[test]
fn exponential_chain_expands_to_every_token() {
    let mut text = String::from("#define e0 a\n");
    for n in 1..=5 {
        let body = vec![format!("e{}", n - 1); 10].join(" ");
        text.push_str(&format!("#define e{n} {body}\n"));
    }
    text.push_str("e5\n");

    let output = run(&text);
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.tokens.len(), 100_000);
    assert!(output.tokens.iter().all(|token| token.is_ident("a")));
}

#[test]
fn expansion_budget_is_reported() {
    let mut text = String::from("#define e0 a\n");
    for n in 1..=5 {
        let body = vec![format!("e{}", n - 1); 10].join(" ");
        text.push_str(&format!("#define e{n} {body}\n"));
    }
    text.push_str("e5\n");

    let limits = ParseLimits {
        max_expanded_tokens: 1_000,
        ..ParseLimits::default()
    };
    let output = Preprocessor::new("main.c", &text, &DialectConfig::default(), &NoIncludes)
        .with_limits(limits)
        .run();
    assert!(output.has_errors());
    assert!(output.tokens.len() < 100_000);
}

#[test]
fn variadic_macros() {
    let output = run("#define P(fmt, ...) printf(fmt, __VA_ARGS__)\nP(\"x\", 1, 2)\n");
    assert_eq!(output.text(), "printf(\"x\", 1, 2)");
}

#[test]
fn named_variadic_parameter() {
    let output = run("#define P(args...) f(args)\nP(1, 2)\n");
    assert_eq!(output.text(), "f(1, 2)");
}

#[test]
fn gnu_comma_elision() {
    let output = run("#define L(fmt, ...) f(fmt, ## __VA_ARGS__)\nL(a) L(a, b)\n");
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.text(), "f(a) f(a, b)");
}

#[test]
fn argument_count_mismatch_is_an_error() {
    let output = run("#define F(a, b) a\nF(1)\n");
    assert_eq!(messages(&output), vec!["macro \"F\" requires 2 arguments, but only 1 given"]);

    let output = run("#define F(a) a\nF(1, 2)\n");
    assert_eq!(messages(&output), vec!["macro \"F\" passed 2 arguments, but takes just 1"]);
}

#[test]
fn unterminated_invocation_is_an_error() {
    let output = run("#define F(a) a\nF(1, \n");
    assert!(output.has_errors());
    assert!(messages(&output)[0].contains("unterminated argument list"));
}

#[test]
fn conditional_branches() {
    let text = "#define X 2
#if X > 1
yes
#elif 1
no1
#else
no2
#endif
#ifdef Y
no3
#endif
#ifndef Y
yes2
#endif
#if defined(X) && !defined Y
yes3
#endif
";
    let output = run(text);
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.text(), "yes\nyes2\nyes3");
}

#[test]
fn elif_chain_takes_first_true_branch() {
    let text = "#if 0\na\n#elif 0\nb\n#elif 1\nc\n#elif 1\nd\n#else\ne\n#endif\n";
    assert_eq!(run(text).text(), "c");
}

#[test]
fn nested_conditionals_in_skipped_region() {
    let text = "#if 0\n#if 1\na\n#else\nb\n#endif\n#else\nc\n#endif\n";
    assert_eq!(run(text).text(), "c");
}

#[test]
fn skipped_regions_do_not_report_lexical_errors() {
    let output = run("#if 0\n'unterminated\n#bogus\n#endif\nok\n");
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.text(), "ok");
}

#[test]
fn unbalanced_conditionals_are_errors() {
    assert_eq!(messages(&run("#if 1\nx\n")), vec!["unterminated conditional directive"]);
    assert_eq!(messages(&run("#endif\n")), vec!["#endif without #if"]);
    assert_eq!(messages(&run("#else\n")), vec!["#else without #if"]);
    assert_eq!(messages(&run("#if 1\n#else\n#else\n#endif\n")), vec!["#else after #else"]);
}

#[test]
fn invalid_condition_is_reported_and_false() {
    let output = run("#if 1 +\nno\n#else\nyes\n#endif\n");
    assert!(output.has_errors());
    assert_eq!(output.text(), "yes");
}

#[test]
fn includes_are_resolved() {
    let includes = InMemoryIncludes::new().with_file("a.h", "int a;\n");
    let output = run_with("#include \"a.h\"\nint b;\n", &includes);
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.text(), "int a;\nint b;");
    assert_eq!(output.sources.len(), 2);
    assert_eq!(output.sources.path(output.tokens[0].location.file), "a.h");
}

#[test]
fn angled_and_computed_includes() {
    let includes = InMemoryIncludes::new().with_file("sys/types.h", "typedef int t;\n");
    let output = run_with("#include <sys/types.h>\n", &includes);
    assert_eq!(output.text(), "typedef int t;");

    let output = run_with("#define H \"sys/types.h\"\n#include H\n", &includes);
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.text(), "typedef int t;");
}

#[test]
fn missing_include_is_an_error() {
    let output = run_with("#include \"missing.h\"\nint b;\n", &InMemoryIncludes::new());
    assert_eq!(messages(&output), vec!["'missing.h' file not found"]);
    assert_eq!(output.text(), "int b;");
}

#[test]
fn errors_record_their_position_in_the_output() {
    let output = run_with("int a;\n#error stop\nint b;\n#include <gone.h>\n", &InMemoryIncludes::new());
    assert_eq!(messages(&output), vec!["#error stop", "'gone.h' file not found"]);
    assert_eq!(output.problems, vec![3, 6]);

    let output = run("#define N 2\nint a;\n");
    assert!(output.problems.is_empty());
}

#[test]
fn pragma_once_and_import_include_a_header_once() {
    let includes = InMemoryIncludes::new()
        .with_file("once.h", "#pragma once\nint a;\n")
        .with_file("plain.h", "int p;\n");
    let output = run_with("#include \"once.h\"\n#include \"once.h\"\n", &includes);
    assert_eq!(output.text(), "int a;");

    let output = run_with("#include \"plain.h\"\n#include \"plain.h\"\n", &includes);
    assert_eq!(output.text(), "int p;\nint p;");

    let output = run_with("#import \"plain.h\"\n#import \"plain.h\"\n", &includes);
    assert_eq!(output.text(), "int p;");
}

#[test]
fn macros_defined_in_headers_are_visible() {
    let includes = InMemoryIncludes::new().with_file("m.h", "#define N 42\n");
    let output = run_with("#include \"m.h\"\nint x = N;\n", &includes);
    assert_eq!(output.text(), "int x = 42;");
    assert!(output.macros.contains("N"));
}

#[test]
fn push_and_pop_macro() {
    let text = "#define X 1
#pragma push_macro(\"X\")
#undef X
#define X 2
X
#pragma pop_macro(\"X\")
X
";
    let output = run(text);
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.text(), "2\n1");
}

#[test]
fn builtin_macros() {
    let output = Preprocessor::new("main.c", "__LINE__\n\n__LINE__ __FILE__\n", &DialectConfig::default(), &NoIncludes).run();
    assert_eq!(output.text(), "1\n3 \"main.c\"");

    let output = preprocess("__cplusplus __STDC_VERSION__", &DialectConfig::cpp());
    assert_eq!(output.text(), "199711L __STDC_VERSION__");

    let output = preprocess("__cplusplus __STDC_VERSION__ __GNUC__", &DialectConfig::c());
    assert_eq!(output.text(), "__cplusplus 199901L __GNUC__");
}

#[test]
fn builtin_macros_cannot_be_redefined() {
    let output = run("#define __LINE__ 3\n#undef __FILE__\n__LINE__\n");
    assert_eq!(
        messages(&output),
        vec!["redefining builtin macro \"__LINE__\"", "undefining builtin macro \"__FILE__\""]
    );
    assert_eq!(output.text(), "3");
}

#[test]
fn incompatible_redefinition_warns_and_replaces() {
    let output = run("#define A 1\n#define A 1\n#define A 2\nA\n");
    assert_eq!(messages(&output), vec!["\"A\" redefined"]);
    assert!(!output.has_errors());
    assert_eq!(output.text(), "2");
}

#[test]
fn malformed_definitions() {
    assert_eq!(messages(&run("#define\n")), vec!["no macro name given in #define directive"]);
    assert_eq!(messages(&run("#define 1 x\n")), vec!["macro names must be identifiers"]);
    assert_eq!(messages(&run("#define F(a, a) a\n")), vec!["duplicate macro parameter \"a\""]);
    assert_eq!(
        messages(&run("#define F(a) ## a\n")),
        vec!["'##' cannot appear at either end of a macro expansion"]
    );
    assert_eq!(messages(&run("#define F(a) #b\n")), vec!["'#' is not followed by a macro parameter"]);
}

#[test]
fn error_and_warning_directives() {
    let output = run("#error stop here\n#warning careful\n");
    assert_eq!(messages(&output), vec!["#error stop here", "#warning careful"]);
    assert_eq!(output.diagnostics[0].severity, crate::diagnostics::Severity::Error);
    assert_eq!(output.diagnostics[1].severity, crate::diagnostics::Severity::Warning);
}

#[test]
fn unknown_directives_and_pragmas() {
    assert_eq!(messages(&run("#frobnicate\n")), vec!["invalid preprocessing directive #frobnicate"]);
    assert!(run("#pragma frobnicate\n").diagnostics.is_empty());
    assert!(run("# 12 \"file.c\" 1\n").diagnostics.is_empty());

    let strict = preprocess("#pragma frobnicate\n", &DialectConfig::default().strict());
    assert_eq!(messages(&strict), vec!["unknown pragma \"frobnicate\""]);
}

#[test]
fn pragma_operator() {
    let output = run("_Pragma(\"GCC system_header\") x\n");
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.text(), "x");

    let output = run("#define X 1\n_Pragma(\"push_macro(\\\"X\\\")\")\n#undef X\n_Pragma(\"pop_macro(\\\"X\\\")\") X\n");
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.text(), "1");
}

#[test]
fn trigraphs_are_normalized_before_lexing() {
    let dialect = DialectConfig::default().with_digraphs_trigraphs();
    let output = preprocess("??=define X <: 1 :>\nX\n", &dialect);
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.text(), "[ 1 ]");
    assert_eq!(usize::from(output.tokens[0].location.range.start()), 20);
}

#[test]
fn trigraphs_stay_literal_when_disabled() {
    let output = run("??=define X 1\nX <: 0 :>\n");
    assert!(output.diagnostics.is_empty(), "{:?}", messages(&output));
    assert!(!output.macros.contains("X"));
    assert_eq!(output.text(), "??=define X 1\nX <: 0 :>");
    assert_eq!(&*output.tokens[0].text, "?");
}

#[test]
fn lexical_errors_are_reported() {
    let output = run("int a = 'x;\n");
    assert_eq!(output.diagnostics[0].kind, ErrorKind::Lex);
}

#[test]
fn expansion_chain_is_recorded() {
    let output = run("#define INNER x\n#define OUTER INNER\nOUTER\n");
    let token = &output.tokens[0];
    assert_eq!(&*token.text, "x");
    let id = token.expansion.expect("token comes from a macro");
    assert_eq!(output.expansions.chain(id), vec!["INNER", "OUTER"]);
}

#[test]
fn completion_marks_identifier_prefix() {
    let output = Preprocessor::new("main.c", "int abc; ab", &DialectConfig::default(), &NoIncludes)
        .with_completion(11)
        .run();
    let last = output.tokens.last().expect("completion token");
    assert_eq!(last.kind, SyntaxKind::CompletionName);
    assert_eq!(&*last.text, "ab");
}

#[test]
fn completion_after_operator_appends_empty_name() {
    let output = Preprocessor::new("main.c", "a-> rest", &DialectConfig::default(), &NoIncludes)
        .with_completion(3)
        .run();
    let kinds: Vec<SyntaxKind> = output.tokens.iter().map(|token| token.kind).collect();
    assert_eq!(kinds, vec![SyntaxKind::Ident, SyntaxKind::Arrow, SyntaxKind::CompletionName]);
    assert_eq!(&*output.tokens[2].text, "");
}

#[test]
fn command_line_definitions() {
    let table = MacroTable::from_definitions(&["DEBUG", "LEVEL=3", "SQ(x)=((x)*(x))"], &DialectConfig::default());
    assert_eq!(table.names(), vec!["DEBUG", "LEVEL", "SQ"]);

    let output = Preprocessor::new("main.c", "DEBUG LEVEL SQ(2)", &DialectConfig::default(), &NoIncludes)
        .with_macros(&table)
        .run();
    assert_eq!(output.text(), "1 3 ((2)*(2))");
}
