use super::*;
use crate::config::DialectConfig;
use crate::parser::parse_text;

fn analyze(text: &str) -> Semantics {
    Semantics::new(&parse_text(text, &DialectConfig::cpp()).unwrap())
}

/// The binding declared by the first name spelled `identifier`.
fn declared(
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

fn expression_types(
    semantics: &Semantics,
    kind: SyntaxKind,
) -> Vec<Type> {
    semantics
        .root()
        .descendants()
        .filter(|node| node.kind() == kind)
        .filter_map(Expression::cast)
        .map(|expression| semantics.type_of_expression(&expression))
        .collect()
}

fn type_text(
    semantics: &Semantics,
    identifier: &str,
) -> String {
    semantics.type_of(declared(semantics, identifier)).to_string()
}

#[test]
fn pointer_to_member_declarator() {
    let semantics = analyze("struct A { int m; }; int A::* pm;");
    assert_eq!(type_text(&semantics, "pm"), "int A::*");
}

#[test]
fn pointer_to_member_access_yields_the_member_type() {
    let semantics = analyze("struct A { int m; }; int A::* pm; void f(A a, A* p) { a.*pm; p->*pm; }");
    let types = expression_types(&semantics, SyntaxKind::PointerToMemberExpression);
    assert_eq!(types, vec![Type::INT, Type::INT]);
}

#[test]
fn address_of_qualified_member_is_a_pointer_to_member() {
    let semantics = analyze("struct A { int m; static int s; }; int A::* pm = &A::m; int* ps = &A::s;");
    let types: Vec<String> = expression_types(&semantics, SyntaxKind::UnaryExpression)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(types, vec!["int A::*", "int *"]);
}

#[test]
fn typedef_of_elaborated_pointer() {
    let semantics = analyze("struct A { int name; }; typedef struct A* PA;");
    assert_eq!(type_text(&semantics, "PA"), "A *");
}

#[test]
fn nested_class_types_are_qualified() {
    let semantics = analyze("namespace N { struct Inner {}; } N::Inner value;");
    assert_eq!(type_text(&semantics, "value"), "N::Inner");
}

#[test]
fn function_type_counts_required_parameters() {
    let semantics = analyze("int f(int a, double b = 1.0);");
    let ty = semantics.type_of(declared(&semantics, "f"));
    assert_eq!(ty.to_string(), "int (int, double)");
    let function = ty.as_function().unwrap();
    assert_eq!(function.required, 1);
    assert!(!function.variadic);
}

#[test]
fn parameters_are_adjusted_to_pointers() {
    let semantics = analyze("void g(int a[3], void h(int));");
    assert_eq!(type_text(&semantics, "g"), "void (int *, void (*)(int))");
}

#[test]
fn multidimensional_arrays_nest_outwards() {
    let semantics = analyze("int grid[2][3]; int (*row)[3];");
    assert_eq!(type_text(&semantics, "grid"), "int [2][3]");
    assert_eq!(type_text(&semantics, "row"), "int (*)[3]");
}

#[test]
fn void_parameter_list_is_empty() {
    let semantics = Semantics::new(&parse_text("int f(void); int g();", &DialectConfig::c()).unwrap());
    let f = semantics.type_of(declared(&semantics, "f"));
    assert!(f.as_function().unwrap().params.is_empty());
    assert!(!f.as_function().unwrap().variadic);
    let g = semantics.type_of(declared(&semantics, "g"));
    assert!(g.as_function().unwrap().variadic);
}

#[test]
fn auto_takes_the_initializer_type() {
    let semantics = analyze("auto v = 1u; auto w = 2.0f; auto big = 4294967296;");
    assert_eq!(semantics.type_of(declared(&semantics, "v")), Type::Builtin(BuiltinType::UnsignedInt));
    assert_eq!(semantics.type_of(declared(&semantics, "w")), Type::Builtin(BuiltinType::Float));
    assert_eq!(semantics.type_of(declared(&semantics, "big")), Type::Builtin(BuiltinType::Long));
}

#[test]
fn arithmetic_converts_to_the_wider_operand() {
    let semantics = analyze("int i; double d; auto s = i + d; auto c = i < d;");
    assert_eq!(semantics.type_of(declared(&semantics, "s")), Type::Builtin(BuiltinType::Double));
    assert_eq!(semantics.type_of(declared(&semantics, "c")), Type::Builtin(BuiltinType::Bool));
}

#[test]
fn character_literals_depend_on_the_dialect() {
    let cpp = analyze("int c = 'x';");
    assert_eq!(expression_types(&cpp, SyntaxKind::LiteralExpression), vec![Type::Builtin(BuiltinType::Char)]);
    let c = Semantics::new(&parse_text("int c = 'x';", &DialectConfig::c()).unwrap());
    assert_eq!(expression_types(&c, SyntaxKind::LiteralExpression), vec![Type::INT]);
}

#[test]
fn this_follows_member_function_qualifiers() {
    let semantics = analyze("struct S { void g() { this; } int h() const { this; return 0; } };");
    let types: Vec<String> = semantics
        .root()
        .descendants()
        .filter_map(Expression::cast)
        .filter(|expression| {
            matches!(expression, Expression::LiteralExpression(literal)
                if literal.token().is_some_and(|token| token.kind() == SyntaxKind::KwThis))
        })
        .map(|expression| semantics.type_of_expression(&expression).to_string())
        .collect();
    assert_eq!(types, vec!["S *", "const S *"]);
}

#[test]
fn call_type_follows_the_chosen_overload() {
    let semantics = analyze("double f(double); int f(int); auto r = f(1); auto q = f(1.5);");
    assert_eq!(semantics.type_of(declared(&semantics, "r")), Type::INT);
    assert_eq!(semantics.type_of(declared(&semantics, "q")), Type::Builtin(BuiltinType::Double));
}

#[test]
fn references_collapse() {
    let semantics = analyze("typedef int& R; R& r = *(int*)0;");
    assert_eq!(type_text(&semantics, "r"), "int &");
}

#[test]
fn sizeof_is_unsigned_long() {
    let semantics = analyze("auto n = sizeof(int);");
    assert_eq!(semantics.type_of(declared(&semantics, "n")), Type::Builtin(BuiltinType::UnsignedLong));
}

#[test]
fn self_referential_initializer_terminates() {
    let semantics = analyze("auto x = x;");
    assert_eq!(semantics.type_of(declared(&semantics, "x")), Type::Unknown);
}
