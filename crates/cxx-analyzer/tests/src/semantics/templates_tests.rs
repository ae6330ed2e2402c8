use super::*;
use crate::config::{DialectConfig, ParseLimits};
use crate::parser::parse_text;
use crate::semantics::BuiltinType;
use crate::syntax::ast::NameRef;
use crate::syntax::kind::SyntaxKind;

fn analyze(text: &str) -> Semantics {
    Semantics::new(&parse_text(text, &DialectConfig::cpp()).unwrap())
}

/// The binding of the first simple name spelled `identifier`.
fn first(
    semantics: &Semantics,
    identifier: &str,
) -> BindingId {
    let name = semantics
        .root()
        .descendants()
        .filter(|node| node.kind() == SyntaxKind::Name)
        .filter_map(NameRef::cast)
        .find(|name| name.identifier() == identifier)
        .unwrap();
    semantics.resolve(&name)
}

fn type_text(
    semantics: &Semantics,
    identifier: &str,
) -> String {
    semantics.type_of(first(semantics, identifier)).to_string()
}

fn member_names(
    semantics: &Semantics,
    variable: &str,
) -> Vec<String> {
    let class = semantics.type_of(first(semantics, variable)).class_binding().unwrap();
    semantics.member_bindings(class).into_iter().map(|id| semantics.name(id)).collect()
}

#[test]
fn members_of_a_specialization_are_substituted() {
    let semantics = analyze("template<class T> struct V { T value; }; V<int> v; auto x = v.value;");
    assert_eq!(type_text(&semantics, "v"), "V<int>");
    assert_eq!(semantics.type_of(first(&semantics, "x")), Type::INT);
    let member = semantics.type_of(first(&semantics, "value"));
    assert!(member.is_dependent());
}

#[test]
fn equal_arguments_share_a_specialization() {
    let semantics = analyze("template<class T> struct V {}; V<int> a; V<int> b; V<long> c;");
    let a = semantics.type_of(first(&semantics, "a"));
    assert_eq!(a, semantics.type_of(first(&semantics, "b")));
    assert_ne!(a, semantics.type_of(first(&semantics, "c")));
    let specialization = semantics.binding(a.class_binding().unwrap()).specialization.unwrap();
    assert_eq!(specialization.template, first(&semantics, "V"));
    assert!(!specialization.explicit);
}

#[test]
fn default_arguments_see_earlier_parameters() {
    let semantics = analyze("template<class T, class U = T*> struct P {}; P<int> p;");
    assert_eq!(type_text(&semantics, "p"), "P<int, int *>");
}

#[test]
fn explicit_specialization_replaces_the_primary() {
    let semantics = analyze(
        "template<class T> struct V { int generic; }; template<> struct V<int> { int special; }; V<int> a; V<char> b;",
    );
    assert_eq!(member_names(&semantics, "a"), vec!["special"]);
    assert_eq!(member_names(&semantics, "b"), vec!["generic"]);
    let class = semantics.type_of(first(&semantics, "a")).class_binding().unwrap();
    assert!(semantics.binding(class).specialization.unwrap().explicit);
}

#[test]
fn alias_templates_substitute_their_arguments() {
    let semantics = analyze("template<class T> using Ptr = T*; Ptr<int> p;");
    assert_eq!(type_text(&semantics, "p"), "int *");
}

#[test]
fn function_templates_deduce_from_arguments() {
    let semantics = analyze("template<class T> T id(T value); auto d = id(2.5); auto p = id(&d);");
    assert_eq!(semantics.type_of(first(&semantics, "d")), Type::Builtin(BuiltinType::Double));
    assert_eq!(type_text(&semantics, "p"), "double *");
}

#[test]
fn bases_of_a_specialization_are_substituted() {
    let semantics = analyze("struct B { int b; }; template<class T> struct D : T { int d; }; D<B> x;");
    assert_eq!(member_names(&semantics, "x"), vec!["d", "b"]);
}

#[test]
fn self_deriving_template_stops_at_the_depth_limit() {
    let parse = parse_text("template<class T> struct L : L<T*> { }; L<int> l; auto m = l.missing;", &DialectConfig::cpp())
        .unwrap();
    let limits = ParseLimits {
        max_instantiation_depth: 8,
        ..ParseLimits::default()
    };
    let semantics = Semantics::with_limits(&parse, &limits);
    let missing = semantics
        .root()
        .descendants()
        .filter_map(NameRef::cast)
        .find(|name| name.identifier() == "missing")
        .unwrap();
    let binding = semantics.binding(semantics.resolve(&missing));
    assert_eq!(binding.problem(), Some(ProblemKind::NotFound));
}
