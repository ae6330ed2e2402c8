use super::*;
use crate::parser::parse_text;
use crate::syntax::kind::SyntaxKind;

fn analyze(text: &str) -> Semantics {
    Semantics::new(&parse_text(text, &DialectConfig::cpp()).unwrap())
}

fn analyze_c(text: &str) -> Semantics {
    Semantics::new(&parse_text(text, &DialectConfig::c()).unwrap())
}

/// Simple name nodes spelled `identifier`, in source order.
fn names(
    semantics: &Semantics,
    identifier: &str,
) -> Vec<NameRef> {
    semantics
        .root()
        .descendants()
        .filter(|node| node.kind() == SyntaxKind::Name)
        .filter_map(NameRef::cast)
        .filter(|name| name.identifier() == identifier)
        .collect()
}

fn resolve_nth(
    semantics: &Semantics,
    identifier: &str,
    index: usize,
) -> BindingId {
    semantics.resolve(&names(semantics, identifier)[index])
}

#[test]
fn qualified_name_includes_owners() {
    let semantics = analyze("namespace N { struct S { void f(); }; }");
    let f = resolve_nth(&semantics, "f", 0);
    assert_eq!(semantics.kind(f), BindingKind::Function);
    assert_eq!(semantics.qualified_name(f), "N::S::f");
}

#[test]
fn reference_and_declaration_share_a_binding() {
    let semantics = analyze("int x; int y = x;");
    let declared = resolve_nth(&semantics, "x", 0);
    let used = resolve_nth(&semantics, "x", 1);
    assert_eq!(declared, used);
    assert_eq!(semantics.kind(used), BindingKind::Variable);
    assert!(semantics.declaration_node(used).is_some());
}

#[test]
fn resolve_all_records_references_only() {
    let semantics = analyze("int x; int y = x + x;");
    let x = resolve_nth(&semantics, "x", 0);
    let table = semantics.resolve_all();
    assert_eq!(table.references_to(x).len(), 2);
}

#[test]
fn redeclarations_merge() {
    let semantics = analyze("void g(int); void g(int a) {}");
    let first = resolve_nth(&semantics, "g", 0);
    let second = resolve_nth(&semantics, "g", 1);
    assert_eq!(first, second);
    let binding = semantics.binding(first);
    assert_eq!(binding.declarations.len(), 2);
    assert!(binding.definition.is_some());
}

#[test]
fn conflicting_declaration_is_a_problem() {
    let semantics = analyze("int v; void v();");
    let variable = resolve_nth(&semantics, "v", 0);
    let function = resolve_nth(&semantics, "v", 1);
    assert_eq!(semantics.kind(variable), BindingKind::Variable);
    assert_eq!(semantics.kind(function), BindingKind::Problem(ProblemKind::ConflictingDeclaration));
    assert_eq!(semantics.binding(function).candidates, vec![variable]);
}

#[test]
fn unknown_name_is_not_found() {
    let semantics = analyze("int y = missing;");
    let missing = resolve_nth(&semantics, "missing", 0);
    assert_eq!(semantics.binding(missing).problem(), Some(ProblemKind::NotFound));
}

#[test]
fn parenthesized_initializer_binds_the_variable_in_cpp() {
    let semantics = analyze("int x = 666; int y(x);");
    let x = resolve_nth(&semantics, "x", 0);
    assert_eq!(resolve_nth(&semantics, "x", 1), x);
    let y = resolve_nth(&semantics, "y", 0);
    assert_eq!(semantics.kind(y), BindingKind::Variable);
    assert_eq!(semantics.type_of(y), Type::INT);
}

#[test]
fn parenthesized_identifier_declares_a_function_in_c() {
    let semantics = analyze_c("int x = 666; int y(x);");
    let y = resolve_nth(&semantics, "y", 0);
    assert_eq!(semantics.kind(y), BindingKind::Function);
    assert_eq!(semantics.type_of(y).to_string(), "int (int)");
}

#[test]
fn inner_declaration_hides_outer() {
    let semantics = analyze("int v; void f() { double v; v = 1; }");
    let inner = resolve_nth(&semantics, "v", 1);
    assert_eq!(resolve_nth(&semantics, "v", 2), inner);
    assert_eq!(semantics.type_of(inner), Type::Builtin(BuiltinType::Double));
}

#[test]
fn using_directive_makes_members_visible() {
    let semantics = analyze("namespace N { int k; } using namespace N; int z = k;");
    let k = resolve_nth(&semantics, "k", 0);
    assert_eq!(resolve_nth(&semantics, "k", 1), k);
}

#[test]
fn qualified_reference_through_namespace() {
    let semantics = analyze("namespace N { int k; } int z = N::k;");
    let k = resolve_nth(&semantics, "k", 0);
    assert_eq!(resolve_nth(&semantics, "k", 1), k);
    assert_eq!(semantics.qualified_name(k), "N::k");
}

#[test]
fn labels_are_found_before_their_statement() {
    let semantics = analyze("void f() { goto done; done: return; }");
    let target = resolve_nth(&semantics, "done", 0);
    assert_eq!(semantics.kind(target), BindingKind::Label);
    assert_eq!(resolve_nth(&semantics, "done", 1), target);
}

#[test]
fn member_access_through_typedef_pointer() {
    let semantics = analyze("struct A { int name; }; typedef struct A* PA; int main() { PA a; return a->name; }");
    let field = resolve_nth(&semantics, "name", 0);
    assert_eq!(semantics.kind(field), BindingKind::Field);
    assert_eq!(resolve_nth(&semantics, "name", 1), field);
}

#[test]
fn members_of_a_class_include_bases() {
    let semantics = analyze("struct B { int b; }; struct D : B { int d; };");
    let derived = resolve_nth(&semantics, "D", 0);
    let members: Vec<String> = semantics.member_bindings(derived).into_iter().map(|id| semantics.name(id)).collect();
    assert_eq!(members, vec!["d", "b"]);
}

#[test]
fn c_tags_live_apart_from_ordinary_names() {
    let semantics = analyze_c("struct S { int a; }; int S; struct S s;");
    let tag = resolve_nth(&semantics, "S", 0);
    let variable = resolve_nth(&semantics, "S", 1);
    assert_ne!(tag, variable);
    assert_eq!(resolve_nth(&semantics, "S", 2), tag);
}
