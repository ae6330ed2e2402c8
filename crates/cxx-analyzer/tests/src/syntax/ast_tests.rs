use super::*;
use crate::config::DialectConfig;
use crate::parser::parse_text;

fn unit(text: &str) -> TranslationUnit {
    parse_text(text, &DialectConfig::cpp()).unwrap().tree().unwrap()
}

fn first<N: AstNode>(unit: &TranslationUnit) -> N {
    unit.syntax().descendants().find_map(N::cast).unwrap()
}

#[test]
fn declarations_are_a_sum_type() {
    let unit = unit("int a; void f() {} namespace n {} template<class T> T id(T);");
    let kinds: Vec<_> = unit
        .declarations()
        .map(|decl| match decl {
            Declaration::SimpleDeclaration(_) => "simple",
            Declaration::FunctionDefinition(_) => "function",
            Declaration::NamespaceDefinition(_) => "namespace",
            Declaration::TemplateDeclaration(_) => "template",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["simple", "function", "namespace", "template"]);
}

#[test]
fn template_declaration_unwraps_to_the_inner_declaration() {
    let unit = unit("template<class T> T id(T);");
    let template = unit.declarations().next().unwrap();
    let inner = template.innermost();
    assert!(matches!(inner, Declaration::SimpleDeclaration(_)));
    let Declaration::TemplateDeclaration(template) = template else {
        panic!("expected a template");
    };
    assert_eq!(template.parameters().unwrap().parameters().count(), 1);
}

#[test]
fn simple_declaration_exposes_specifiers_and_declarators() {
    let unit = unit("static const int a = 1, *b;");
    let decl: SimpleDeclaration = first(&unit);
    let specifiers = decl.specifiers().unwrap();
    assert!(specifiers.has_keyword(SyntaxKind::KwStatic));
    assert!(!specifiers.is_typedef());
    let declarators: Vec<_> = decl.declarators().collect();
    assert_eq!(declarators.len(), 2);
    assert!(matches!(declarators[0].initializer(), Some(Initializer::EqualsInitializer(_))));
    assert!(matches!(declarators[1].pointer_operators().next(), Some(PtrOperator::PointerOp(_))));
}

#[test]
fn class_specifier_members_and_bases() {
    let unit = unit("struct B {}; struct D : public virtual B { int x; void f(); };");
    let class = unit.syntax().descendants().filter_map(ClassSpecifier::cast).nth(1).unwrap();
    assert_eq!(class.key(), Some(SyntaxKind::KwStruct));
    assert_eq!(class.name().unwrap().identifier(), "D");
    let bases: Vec<_> = class.bases().collect();
    assert_eq!(bases.len(), 1);
    assert!(bases[0].is_virtual());
    assert_eq!(class.members().count(), 2);
}

#[test]
fn enum_specifier_enumerators() {
    let unit = unit("enum class Color { Red, Green = 2 };");
    let enumeration: EnumSpecifier = first(&unit);
    assert!(enumeration.is_scoped());
    let names: Vec<_> = enumeration.enumerators().filter_map(|e| e.name()).map(|name| name.text()).collect();
    assert_eq!(names, vec!["Red", "Green"]);
}

#[test]
fn pointer_to_member_class_text() {
    let unit = unit("namespace n { struct A {}; } int n::A::* pm;");
    let op: PointerToMemberOp = first(&unit);
    assert_eq!(op.class_text(), "n::A");
    assert!(!op.is_global());
}

#[test]
fn field_reference_parts() {
    let unit = unit("struct S { int v; }; int f(S* s) { return s->v; }");
    let field: FieldReference = first(&unit);
    assert!(field.is_arrow());
    assert_eq!(field.member().unwrap().identifier(), "v");
    assert!(matches!(field.object(), Some(Expression::IdExpression(_))));
}

#[test]
fn call_arguments() {
    let unit = unit("int g(int, int); int h() { return g(1, 2 + 3); }");
    let call: FunctionCallExpression = first(&unit);
    assert!(matches!(call.callee(), Some(Expression::IdExpression(_))));
    assert_eq!(call.arguments().count(), 2);
}

#[test]
fn destructor_and_operator_identifiers() {
    let unit = unit("struct S { ~S(); S& operator=(const S&); };");
    let names: Vec<_> = unit
        .syntax()
        .descendants()
        .filter_map(Declarator::cast)
        .filter_map(|declarator| declarator.name())
        .map(|name| name.identifier())
        .collect();
    assert_eq!(names, vec!["~S", "operator="]);
}
