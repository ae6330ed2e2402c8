use super::*;
use crate::config::AnalyzerSettings;
use crate::diagnostics::ErrorKind;
use crate::semantics::ScopeKind;
use crate::syntax::ast::AstNode;
use crate::syntax::kind::SyntaxKind;

/// Removes the `$0` marker and returns the text with its offset.
fn caret(marked: &str) -> (String, usize) {
    let offset = marked.find("$0").unwrap();
    (marked.replacen("$0", "", 1), offset)
}

/// Span of the `nth` occurrence of `needle`.
fn span(
    text: &str,
    needle: &str,
    nth: usize,
) -> (usize, usize) {
    let start = text.match_indices(needle).nth(nth).unwrap().0;
    (start, start + needle.len())
}

fn complete(marked: &str) -> CompletionNode {
    let (text, offset) = caret(marked);
    complete_at(&text, offset)
}

#[test]
fn parse_keeps_declarations_in_source_order() {
    let parse = parse("int a; struct S { int m; }; void f();", &DialectConfig::cpp()).unwrap();
    let declarations: Vec<&str> = parse
        .tree()
        .unwrap()
        .declarations()
        .map(|declaration| parse.sources().slice(parse.file_location(declaration.syntax()).unwrap()).unwrap())
        .collect();
    assert_eq!(declarations, vec!["int a;", "struct S { int m; };", "void f();"]);
    assert!(!parse.has_errors());
}

#[test]
fn strict_parse_reports_the_error_kind() {
    let failure = parse("int x = ;", &DialectConfig::cpp().strict()).unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::Syntax);
}

#[test]
fn selects_the_name_under_the_span() {
    let text = "int value = 42;";
    let (start, end) = span(text, "value", 0);
    let selection = select_at(text, start, end, false).unwrap();
    assert_eq!(selection.kind, SyntaxKind::Name);
    assert_eq!(selection.text, "value");
    assert_eq!(selection.location.offset(), start);
    assert!(selection.binding.is_none());
}

#[test]
fn selects_the_smallest_node_covering_several_tokens() {
    let text = "int a, b; int x = a + b;";
    let (start, _) = span(text, "a + b", 0);
    let selection = select_at(text, start, start + "a + b".len(), false).unwrap();
    assert_eq!(selection.kind, SyntaxKind::BinaryExpression);
    assert_eq!(selection.text, "a + b");

    let reversed = select_at(text, start + "a + b".len(), start, false).unwrap();
    assert_eq!(reversed.kind, selection.kind);
    assert_eq!(reversed.location, selection.location);
    assert_eq!(reversed.node.text_range(), selection.node.text_range());
}

#[test]
fn whitespace_selects_nothing() {
    let text = "int a;      int b;";
    assert!(select_at(text, 9, 9, false).is_none());
    assert!(select_at(text, 7, 10, true).is_none());
}

#[test]
fn problem_statements_are_not_selectable() {
    let text = "void f() { a b c; }";
    let (start, end) = span(text, "a b c", 0);
    assert!(select_at(text, start, end, true).is_none());
}

#[test]
fn reference_and_declaration_select_the_same_binding() {
    let text = "int value = 42; int other = value;";
    let (start, end) = span(text, "value", 1);
    let reference = select_at(text, start, end, true).unwrap().binding.unwrap();
    assert_eq!(reference.name, "value");
    assert_eq!(reference.kind, BindingKind::Variable);
    assert_eq!(reference.detail.as_deref(), Some("int"));

    let (start, end) = span(text, "value", 0);
    let declaration = select_at(text, start, end, true).unwrap().binding.unwrap();
    assert_eq!(declaration.id, reference.id);
}

#[test]
fn member_of_a_specialization_reads_with_its_arguments() {
    let text = "template<class T> struct X { T v; }; X<int> xi; int q = xi.v;";
    let (start, end) = span(text, "v", 0);
    let declared = select_at(text, start, end, true).unwrap().binding.unwrap();
    assert_eq!(declared.detail.as_deref(), Some("T"));

    let (start, end) = span(text, "v", 1);
    let accessed = select_at(text, start, end, true).unwrap().binding.unwrap();
    assert_eq!(accessed.kind, BindingKind::Field);
    assert_eq!(accessed.detail.as_deref(), Some("int"));

    let node = complete("template<class T> struct X { T v; }; int main() { X<int> xi; xi.$0 }");
    assert_eq!(node.candidate_names(), vec!["v"]);
    assert_eq!(node.candidates[0].detail.as_deref(), Some("int"));
}

#[test]
fn failed_lookup_selects_a_problem_binding() {
    let text = "int x = missing;";
    let (start, end) = span(text, "missing", 0);
    let binding = select_at(text, start, end, true).unwrap().binding.unwrap();
    assert_eq!(binding.problem(), Some(ProblemKind::NotFound));
    assert_eq!(binding.name, "missing");
}

#[test]
fn selection_inside_a_macro_invocation_reports_the_source_text() {
    let text = "#define V 1\nint x = V;";
    let (start, end) = span(text, "V", 1);
    let selection = select_at(text, start, end, false).unwrap();
    assert_eq!(selection.kind, SyntaxKind::LiteralExpression);
    assert_eq!(selection.text, "V");
}

#[test]
fn member_completion_through_a_pointer_typedef() {
    let node = complete("struct A { int name; }; typedef struct A* PA; int main(){ PA a; a->$0 }");
    assert_eq!(node.candidate_names(), vec!["name"]);
    assert_eq!(node.prefix, "");
    assert_eq!(
        node.context,
        CompletionContext::Member {
            arrow: true,
            class: Some("A".to_string()),
        }
    );
}

#[test]
fn member_completion_filters_by_prefix() {
    let node = complete("struct P { int alpha; int beta; int alps; }; void f(P p) { p.al$0 }");
    assert_eq!(node.prefix, "al");
    assert_eq!(node.candidate_names(), vec!["alpha", "alps"]);
    assert!(matches!(
        node.context,
        CompletionContext::Member {
            arrow: false,
            ..
        }
    ));
}

#[test]
fn block_declarations_are_visible_only_after_they_appear() {
    let node = complete("void f() { int before; $0 int after; }");
    let names = node.candidate_names();
    assert!(names.contains(&"before"));
    assert!(names.contains(&"f"));
    assert!(!names.contains(&"after"));
    assert_eq!(node.scope_kind, ScopeKind::Function);
    assert_eq!(node.context, CompletionContext::Unqualified);
}

#[test]
fn builtins_need_an_underscore_prefix() {
    let plain = complete("void f() { $0 }");
    assert!(plain.candidate_names().iter().all(|name| !name.starts_with("__builtin")));
    let underscored = complete("void f() { __builtin_va$0 }");
    assert!(underscored.candidate_names().contains(&"__builtin_va_list"));
}

#[test]
fn class_members_are_visible_before_their_declaration() {
    let node = complete("struct S { void f() { mem$0 } int member; int other; };");
    assert_eq!(node.candidate_names(), vec!["member"]);
}

#[test]
fn qualified_completion_lists_namespace_members() {
    let node = complete("namespace N { int alpha; int beta; } int x = N::$0");
    assert_eq!(
        node.context,
        CompletionContext::Qualified {
            qualifier: "N".to_string(),
        }
    );
    assert_eq!(node.candidate_names(), vec!["alpha", "beta"]);
    assert!(node.macros.is_empty());
}

#[test]
fn macros_defined_before_the_caret_are_offered() {
    let node = complete("#define MAX_SIZE 10\nint maximum; int y = MA$0;\n#define MAX_LATER 1");
    assert_eq!(node.macros, vec!["MAX_SIZE"]);
    assert!(node.candidates.is_empty());
}

#[test]
fn completion_stays_tolerant_in_strict_dialects() {
    let input = QueryInput::new(DialectConfig::cpp().strict());
    let (text, offset) = caret("struct A { int name; }; void f(A* a) { a->$0");
    assert_eq!(complete_with(&input, &text, offset).candidate_names(), vec!["name"]);
}

#[test]
fn settings_supply_command_line_macros() {
    let mut settings = AnalyzerSettings::default();
    settings.preprocessor.defines = vec!["WIDTH=4".to_string()];
    let input = QueryInput::from_settings("<main>", &settings, &NoIncludes);

    let text = "int w = WIDTH;";
    let (start, end) = span(text, "WIDTH", 0);
    let selection = select_with(&input, text, start, end, false).unwrap();
    assert_eq!(selection.kind, SyntaxKind::LiteralExpression);

    let node = complete_with(&input, "int v = WI", 10);
    assert_eq!(node.macros, vec!["WIDTH"]);
}
