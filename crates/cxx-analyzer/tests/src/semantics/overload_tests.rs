use super::*;
use crate::config::DialectConfig;
use crate::parser::parse_text;
use crate::semantics::BindingKind;
use crate::syntax::ast::{AstNode, NameRef};
use crate::syntax::kind::SyntaxKind;

fn analyze(text: &str) -> Semantics {
    Semantics::new(&parse_text(text, &DialectConfig::cpp()).unwrap())
}

/// Bindings of every callee spelled `identifier`, in source order.
fn callees(
    semantics: &Semantics,
    identifier: &str,
) -> Vec<BindingId> {
    semantics
        .root()
        .descendants()
        .filter(|node| node.kind() == SyntaxKind::FunctionCallExpression)
        .filter_map(|call| call.descendants().filter_map(NameRef::cast).next())
        .filter(|name| name.identifier() == identifier)
        .map(|name| semantics.resolve(&name))
        .collect()
}

/// Declarations of `identifier` in source order, one per binding.
fn declarations(
    semantics: &Semantics,
    identifier: &str,
) -> Vec<BindingId> {
    let mut found: Vec<BindingId> = semantics
        .root()
        .descendants()
        .filter_map(|node| semantics.declared_binding(&node))
        .filter(|&id| semantics.name(id) == identifier)
        .collect();
    found.dedup();
    found
}

fn argument(ty: Type) -> Argument {
    Argument {
        ty,
        null_pointer: false,
    }
}

#[test]
fn exact_match_beats_conversion() {
    let semantics = analyze("void f(int); void f(double); void g() { f(1); f(1.0); f('c'); }");
    let overloads = declarations(&semantics, "f");
    assert_eq!(callees(&semantics, "f"), vec![overloads[0], overloads[1], overloads[0]]);
}

#[test]
fn equal_conversions_are_ambiguous() {
    let semantics = analyze("void f(long); void f(double); void g() { f(1); }");
    let chosen = callees(&semantics, "f")[0];
    let binding = semantics.binding(chosen);
    assert_eq!(binding.problem(), Some(ProblemKind::Ambiguous));
    assert_eq!(binding.candidates, declarations(&semantics, "f"));
}

#[test]
fn arity_mismatch_is_not_viable() {
    let semantics = analyze("void f(int, int); void g() { f(1); }");
    let chosen = callees(&semantics, "f")[0];
    assert_eq!(semantics.binding(chosen).problem(), Some(ProblemKind::NoViableOverload));
}

#[test]
fn default_arguments_make_parameters_optional() {
    let semantics = analyze("void f(int, int = 0); void f(double); void g() { f(1); }");
    assert_eq!(callees(&semantics, "f"), vec![declarations(&semantics, "f")[0]]);
}

#[test]
fn ellipsis_loses_to_a_declared_parameter() {
    let semantics = analyze("void f(...); void f(int); void g() { f(1); }");
    assert_eq!(callees(&semantics, "f"), vec![declarations(&semantics, "f")[1]]);
}

#[test]
fn only_a_null_constant_converts_to_a_pointer() {
    let semantics = analyze("void f(int*); void g() { f(0); f(1); }");
    let f = declarations(&semantics, "f")[0];
    let chosen = callees(&semantics, "f");
    assert_eq!(chosen[0], f);
    assert_eq!(semantics.binding(chosen[1]).problem(), Some(ProblemKind::NoViableOverload));
}

#[test]
fn derived_pointer_converts_to_base_pointer() {
    let semantics = analyze("struct B {}; struct D : B {}; void f(B*); void f(int); void g(D* d) { f(d); }");
    assert_eq!(callees(&semantics, "f"), vec![declarations(&semantics, "f")[0]]);
}

#[test]
fn adding_const_is_an_exact_match() {
    let semantics = analyze("void f(const int*); void f(double); void g(int* p) { f(p); }");
    assert_eq!(callees(&semantics, "f"), vec![declarations(&semantics, "f")[0]]);
}

#[test]
fn non_template_wins_a_tie() {
    let semantics = analyze("template<class T> void f(T); void f(int); void g() { f(1); }");
    let overloads = declarations(&semantics, "f");
    assert_eq!(overloads.len(), 2);
    let chosen = callees(&semantics, "f")[0];
    assert_eq!(chosen, overloads[1]);
    assert_eq!(semantics.kind(chosen), BindingKind::Function);
}

#[test]
fn template_deduction_makes_a_better_match() {
    let semantics = analyze("template<class T> void f(T); void f(int); void g() { f(1.5); }");
    assert_eq!(callees(&semantics, "f"), vec![declarations(&semantics, "f")[0]]);
}

#[test]
fn c_calls_skip_overload_resolution() {
    let semantics = Semantics::new(&parse_text("void f(int); void g(void) { f(1.5); }", &DialectConfig::c()).unwrap());
    assert_eq!(callees(&semantics, "f"), declarations(&semantics, "f"));
}

#[test]
fn conversion_ranks() {
    let semantics = analyze("");
    let short = Type::Builtin(BuiltinType::Short);
    assert_eq!(semantics.conversion_rank(&argument(Type::INT), &Type::INT), Some(Rank::Exact));
    assert_eq!(semantics.conversion_rank(&argument(short), &Type::INT), Some(Rank::Promotion));
    assert_eq!(
        semantics.conversion_rank(&argument(Type::INT), &Type::Builtin(BuiltinType::Bool)),
        Some(Rank::Conversion)
    );
    assert_eq!(semantics.conversion_rank(&argument(Type::INT.pointer_to()), &Type::INT), None);
    assert_eq!(
        semantics.conversion_rank(&argument(Type::Unknown), &Type::INT.pointer_to()),
        Some(Rank::Conversion)
    );
    let array = Type::Array {
        element: Box::new(Type::INT),
        size: Some(4),
    };
    assert_eq!(semantics.conversion_rank(&argument(array), &Type::INT.pointer_to()), Some(Rank::Exact));
}
