mod common;

use cxx_analyzer::config::DialectConfig;
use cxx_analyzer::ide::{CompletionContext, QueryInput, complete_at, parse, select_at, select_with};
use cxx_analyzer::syntax::kind::SyntaxKind;
use cxx_analyzer::{BindingKind, Semantics};

use crate::common::{caret, span_of, span_of_nth};

#[test]
fn template_constructor_name_is_a_template_id() {
    let text = "template<class E> class X { X<E>(); };";
    let parse = parse(text, &DialectConfig::cpp()).unwrap();
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    assert!(parse.syntax().descendants().all(|node| node.kind() != SyntaxKind::BinaryExpression));

    let (start, end) = span_of(text, "X<E>");
    let selection = select_at(text, start, end, false).unwrap();
    assert_eq!(selection.kind, SyntaxKind::TemplateId);
    assert_eq!(selection.text, "X<E>");
}

#[test]
fn pointer_to_member_declarations_and_accesses() {
    let text = "struct A { int m; }; int A::* pm; void f(A a, A* p) { a.*pm; p->*pm; }";

    let (start, end) = span_of(text, "pm");
    let declared = select_at(text, start, end, true).unwrap().binding.unwrap();
    assert_eq!(declared.kind, BindingKind::Variable);
    assert_eq!(declared.detail.as_deref(), Some("int A::*"));

    let (start, end) = span_of(text, "a.*pm");
    assert_eq!(select_at(text, start, end, false).unwrap().kind, SyntaxKind::PointerToMemberExpression);
    let (start, end) = span_of(text, "p->*pm");
    assert_eq!(select_at(text, start, end, false).unwrap().kind, SyntaxKind::PointerToMemberExpression);

    let (start, end) = span_of_nth(text, "pm", 2);
    let used = select_at(text, start, end, true).unwrap().binding.unwrap();
    assert_eq!(used.id, declared.id);
}

#[test]
fn parenthesized_initializer_is_classified_the_same_everywhere() {
    let text = "int x = 666; int y(x);";
    let (start, end) = span_of(text, "(x)");
    assert_eq!(select_at(text, start, end, false).unwrap().kind, SyntaxKind::ConstructorInitializer);

    let (start, end) = span_of(text, "y");
    let y = select_at(text, start, end, true).unwrap().binding.unwrap();
    assert_eq!(y.kind, BindingKind::Variable);
    assert_eq!(y.detail.as_deref(), Some("int"));

    let (start, end) = span_of_nth(text, "x", 1);
    let argument = select_at(text, start, end, true).unwrap().binding.unwrap();
    let (start, end) = span_of(text, "x");
    assert_eq!(select_at(text, start, end, true).unwrap().binding.unwrap().id, argument.id);

    // The same text in C declares a K&R function with parameter `x`.
    let c = QueryInput::new(DialectConfig::c());
    let (start, end) = span_of(text, "y");
    let y = select_with(&c, text, start, end, true).unwrap().binding.unwrap();
    assert_eq!(y.kind, BindingKind::Function);
}

#[test]
fn arrow_completion_through_a_typedef_returns_exactly_the_member() {
    let (text, offset) = caret("struct A { int name; }; typedef struct A* PA; int main(){ PA a; a->$0 }");
    let node = complete_at(&text, offset);
    assert_eq!(node.candidate_names(), vec!["name"]);
    assert!(node.macros.is_empty());
    assert_eq!(
        node.context,
        CompletionContext::Member {
            arrow: true,
            class: Some("A".to_string()),
        }
    );
}

#[test]
fn every_name_in_a_clean_unit_resolves() {
    let text = r#"
namespace geo {
    struct Point { int x; int y; };
    int dot(const Point& a, const Point& b) { return a.x * b.x + a.y * b.y; }
}
template<class T> T twice(T value) { return value + value; }
int main() {
    geo::Point p = { 1, 2 };
    int d = geo::dot(p, p);
    return twice(d);
}
"#;
    let parse = parse(text, &DialectConfig::cpp()).unwrap();
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    let table = Semantics::new(&parse).resolve_all();
    let root = parse.syntax();
    let problems: Vec<String> = table
        .references()
        .filter(|&(_, id)| table.get(id).is_problem())
        .map(|(name, _)| name.to_node(&root).text().to_string())
        .collect();
    assert!(problems.is_empty(), "unresolved: {problems:?}");
}
