use super::*;
use crate::parser::parse_text;

fn collect_text(
    text: &str,
    dialect: DialectConfig,
) -> Collected {
    let parse = parse_text(text, &dialect).unwrap();
    collect(&parse.syntax(), &dialect)
}

fn named<'a>(
    collected: &'a Collected,
    name: &'a str,
) -> Vec<(BindingId, &'a Binding)> {
    collected.bindings.named(name).collect()
}

fn entry_names(
    collected: &Collected,
    scope: ScopeId,
) -> Vec<String> {
    collected.scopes.get(scope).entries().iter().map(|entry| entry.name.clone()).collect()
}

#[test]
fn scopes_nest_in_declaration_order() {
    let collected = collect_text("namespace N { struct S { void f() { { int x; } } }; }", DialectConfig::cpp());
    let kinds: Vec<ScopeKind> = collected.scopes.iter().map(|(_, scope)| scope.kind).collect();
    assert_eq!(
        kinds,
        vec![ScopeKind::Global, ScopeKind::Namespace, ScopeKind::Class, ScopeKind::Function, ScopeKind::Block]
    );
    let (_, x) = named(&collected, "x")[0];
    let block = x.scope.unwrap();
    let chain: Vec<ScopeKind> = collected.scopes.ancestors(block).map(|scope| collected.scopes.get(scope).kind).collect();
    assert_eq!(chain, kinds.into_iter().rev().collect::<Vec<_>>());
}

#[test]
fn reopened_namespace_shares_its_body() {
    let collected = collect_text("namespace N { int a; } namespace N { int b; }", DialectConfig::cpp());
    let namespaces = named(&collected, "N");
    assert_eq!(namespaces.len(), 1);
    let (_, namespace) = namespaces[0];
    assert_eq!(namespace.declarations.len(), 2);
    assert_eq!(entry_names(&collected, namespace.body.unwrap()), vec!["a", "b"]);
}

#[test]
fn overloads_are_separate_bindings() {
    let collected = collect_text("void f(int); void f(double); void f(int x);", DialectConfig::cpp());
    let overloads = named(&collected, "f");
    assert_eq!(overloads.len(), 2);
    assert_eq!(overloads[0].1.declarations.len(), 2);
    assert_eq!(overloads[1].1.declarations.len(), 1);
}

#[test]
fn c_functions_never_overload() {
    let collected = collect_text("void f(int); void f(double);", DialectConfig::c());
    assert_eq!(named(&collected, "f").len(), 1);
}

#[test]
fn constructors_stay_out_of_lookup() {
    let collected = collect_text("struct S { S(); S(int); int v; };", DialectConfig::cpp());
    let (_, class) = named(&collected, "S")
        .into_iter()
        .find(|(_, binding)| matches!(binding.kind, BindingKind::Class(_)))
        .unwrap();
    let body = collected.scopes.get(class.body.unwrap());
    assert_eq!(body.constructors().len(), 2);
    assert_eq!(entry_names(&collected, class.body.unwrap()), vec!["v"]);
}

#[test]
fn anonymous_union_members_are_transparent() {
    let collected = collect_text("struct S { union { int i; float f; }; };", DialectConfig::cpp());
    let (_, class) = named(&collected, "S")[0];
    let body = collected.scopes.get(class.body.unwrap());
    assert_eq!(body.transparent.len(), 1);
    assert_eq!(entry_names(&collected, body.transparent[0]), vec!["i", "f"]);
}

#[test]
fn enumerators_of_unscoped_enums_join_the_enclosing_scope() {
    let collected = collect_text("enum Color { Red, Green }; enum class Mode { On };", DialectConfig::cpp());
    assert_eq!(entry_names(&collected, ScopeId::GLOBAL), vec!["Color", "Red", "Green", "Mode"]);
    let (color, _) = named(&collected, "Color")[0];
    assert_eq!(named(&collected, "Red")[0].1.owner, Some(color));
    let (_, mode) = named(&collected, "Mode")[0];
    assert_eq!(entry_names(&collected, mode.body.unwrap()), vec!["On"]);
}

#[test]
fn labels_belong_to_the_function() {
    let collected = collect_text("void f() { { again: ; } goto again; }", DialectConfig::cpp());
    let (label, binding) = named(&collected, "again")[0];
    assert_eq!(binding.kind, BindingKind::Label);
    let function = collected.scopes.get(binding.scope.unwrap());
    assert_eq!(function.kind, ScopeKind::Function);
    assert_eq!(function.labels.get("again"), Some(&label));
}

#[test]
fn explicit_specializations_are_recorded_against_the_template() {
    let collected = collect_text("template<class T> struct V {}; template<> struct V<int> {};", DialectConfig::cpp());
    let versions = named(&collected, "V");
    assert_eq!(versions.len(), 2);
    let (primary, _) = versions[0];
    let (specialization, _) = versions[1];
    assert!(versions[0].1.is_template());
    let recorded = &collected.explicit_specializations[&primary];
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].binding, specialization);
}

#[test]
fn tags_and_ordinary_names_coexist() {
    let collected = collect_text("struct S; int S;", DialectConfig::c());
    let found = named(&collected, "S");
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|(_, binding)| !binding.is_problem()));
}

#[test]
fn redeclaring_with_another_kind_conflicts() {
    let collected = collect_text("int v; typedef int v;", DialectConfig::cpp());
    let found = named(&collected, "v");
    assert_eq!(found.len(), 2);
    assert_eq!(found[1].1.problem(), Some(ProblemKind::ConflictingDeclaration));
    assert_eq!(found[1].1.candidates, vec![found[0].0]);
}

#[test]
fn gnu_dialects_predeclare_builtins() {
    let collected = collect_text("", DialectConfig::gnu_c());
    assert!(!named(&collected, "__builtin_va_list").is_empty());
    assert!(collected.builtin_types.iter().any(|(id, _)| collected.bindings.get(*id).name == "__builtin_va_list"));
    let plain = collect_text("", DialectConfig::c());
    assert!(named(&plain, "__builtin_va_list").is_empty());
}
