use super::*;
use crate::diagnostics::ErrorKind;
use crate::syntax::ast::{Declaration, Declarator, NameRef};
use crate::syntax::kind::SyntaxKind;

fn parse_cpp(text: &str) -> Parse {
    parse_text(text, &DialectConfig::cpp()).unwrap()
}

fn count(
    parse: &Parse,
    kind: SyntaxKind,
) -> usize {
    parse.syntax().descendants().filter(|node| node.kind() == kind).count()
}

fn declarators(parse: &Parse) -> Vec<Declarator> {
    parse.syntax().descendants().filter_map(Declarator::cast).collect()
}

fn top_level_kinds(parse: &Parse) -> Vec<SyntaxKind> {
    parse.tree().unwrap().declarations().map(|decl| decl.syntax().kind()).collect()
}

#[test]
fn template_constructor_is_a_template_id() {
    let parse = parse_cpp("template<class E> class X { X<E>(); };");
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    assert_eq!(count(&parse, SyntaxKind::BinaryExpression), 0);

    let member = declarators(&parse)
        .into_iter()
        .find(|declarator| declarator.name().is_some())
        .unwrap();
    assert!(matches!(member.name(), Some(NameRef::TemplateId(_))));
    assert!(member.is_function());
    assert_eq!(member.name().unwrap().identifier(), "X");
}

#[test]
fn pointer_to_member_declarator() {
    let parse = parse_cpp("struct A { int m; }; int A::* pm;");
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    let pm = declarators(&parse)
        .into_iter()
        .find(|declarator| declarator.name().is_some_and(|name| name.identifier() == "pm"))
        .unwrap();
    let operators: Vec<_> = pm.pointer_operators().collect();
    assert_eq!(operators.len(), 1);
    assert_eq!(operators[0].syntax().kind(), SyntaxKind::PointerToMemberOp);
    assert!(!pm.is_function());
}

#[test]
fn pointer_to_member_access_expressions() {
    let text = "struct A { int m; }; int A::* pm; void f(A a, A* p) { a.*pm; p->*pm; }";
    let parse = parse_cpp(text);
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    let accesses: Vec<_> = parse
        .syntax()
        .descendants()
        .filter_map(crate::syntax::ast::PointerToMemberExpression::cast)
        .collect();
    assert_eq!(accesses.len(), 2);
    assert!(!accesses[0].is_arrow());
    assert!(accesses[1].is_arrow());
}

#[test]
fn pointer_to_member_operators_are_plain_tokens_in_c() {
    let parse = parse_text("int f(int a) { return a; }", &DialectConfig::c()).unwrap();
    assert!(!parse.has_errors());
    assert_eq!(count(&parse, SyntaxKind::PointerToMemberExpression), 0);
}

#[test]
fn parenthesized_value_is_a_constructor_initializer_in_cpp() {
    let parse = parse_cpp("int x = 666; int y(x);");
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    let y = declarators(&parse).pop().unwrap();
    assert!(!y.is_function());
    assert_eq!(y.initializer().unwrap().syntax().kind(), SyntaxKind::ConstructorInitializer);
}

#[test]
fn parenthesized_type_declares_a_function_in_cpp() {
    let parse = parse_cpp("struct T {}; int z(T);");
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    let z = declarators(&parse).pop().unwrap();
    assert!(z.is_function());
}

#[test]
fn parenthesized_identifier_is_a_knr_declaration_in_c() {
    let parse = parse_text("int x = 666; int y(x);", &DialectConfig::c()).unwrap();
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    let y = declarators(&parse).pop().unwrap();
    assert!(y.is_function());
    assert_eq!(y.function_parameters().unwrap().identifiers().count(), 1);
}

#[test]
fn function_pointer_is_not_a_function() {
    let parse = parse_cpp("int (*fp)(int); int *g(int); int (h)(int);");
    let declarators = declarators(&parse);
    let outer: Vec<_> = declarators
        .iter()
        .filter(|declarator| declarator.syntax().parent().is_some_and(|parent| parent.kind() == SyntaxKind::SimpleDeclaration))
        .collect();
    assert_eq!(outer.len(), 3);
    assert!(!outer[0].is_function());
    assert!(outer[1].is_function());
    assert!(outer[2].is_function());
}

#[test]
fn broken_declaration_becomes_a_problem_node() {
    let parse = parse_cpp("int a; int b = ; int c;");
    assert_eq!(
        top_level_kinds(&parse),
        vec![SyntaxKind::SimpleDeclaration, SyntaxKind::ProblemDeclaration, SyntaxKind::SimpleDeclaration]
    );
    let errors: Vec<_> = parse.diagnostics().iter().filter(|diagnostic| diagnostic.is_error()).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Syntax);
}

#[test]
fn strict_mode_fails_on_the_first_error() {
    let failure = parse_text("int a; int b = ; int c;", &DialectConfig::cpp().strict()).unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::Syntax);
    assert_eq!(failure.diagnostic().severity, Severity::Fatal);
    assert!(failure.to_string().starts_with("FAILURE"));
}

#[test]
fn strict_mode_accepts_valid_input() {
    let parse = parse_text("int a; int c;", &DialectConfig::cpp().strict()).unwrap();
    assert_eq!(top_level_kinds(&parse).len(), 2);
}

#[test]
fn statement_with_no_reading_is_ambiguity_exhausted() {
    let parse = parse_cpp("void f() { a b c; }");
    assert_eq!(count(&parse, SyntaxKind::ProblemStatement), 1);
    assert!(parse.diagnostics().iter().any(|diagnostic| diagnostic.kind == ErrorKind::AmbiguityExhausted));
    assert_eq!(count(&parse, SyntaxKind::FunctionDefinition), 1);
}

#[test]
fn known_type_statement_is_a_declaration() {
    let parse = parse_cpp("struct T {}; void f() { T * p; int q; q * 2; }");
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    assert_eq!(count(&parse, SyntaxKind::DeclarationStatement), 2);
    assert_eq!(count(&parse, SyntaxKind::ExpressionStatement), 1);
}

#[test]
fn designated_initializers_follow_the_dialect() {
    let text = "struct P { int x; }; P p = { .x = 1 };";
    let plain = parse_cpp(text);
    assert!(
        plain
            .diagnostics()
            .iter()
            .any(|diagnostic| diagnostic.message.contains("designated initializers are not enabled"))
    );
    assert_eq!(count(&plain, SyntaxKind::DesignatedInitializer), 0);

    let gnu = parse_text(text, &DialectConfig::gnu_cpp()).unwrap();
    assert!(!gnu.has_errors(), "{:?}", gnu.diagnostics());
    assert_eq!(count(&gnu, SyntaxKind::DesignatedInitializer), 1);
}

#[test]
fn statement_expressions_need_gnu() {
    let text = "int f() { return ({ int y = 1; y; }); }";
    let gnu = parse_text(text, &DialectConfig::gnu_cpp()).unwrap();
    assert!(!gnu.has_errors(), "{:?}", gnu.diagnostics());
    assert_eq!(count(&gnu, SyntaxKind::StatementExpression), 1);

    let plain = parse_cpp(text);
    assert!(plain.has_errors());
    assert_eq!(count(&plain, SyntaxKind::StatementExpression), 0);
}

#[test]
fn nested_template_arguments_close_with_a_shift() {
    let parse = parse_cpp("template<class T> struct V {}; V<V<int>> v; int s = 8 >> 1;");
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    assert_eq!(count(&parse, SyntaxKind::TemplateId), 2);
    let shift = parse
        .syntax()
        .descendants()
        .filter_map(crate::syntax::ast::BinaryExpression::cast)
        .next()
        .unwrap();
    let operator = shift.operator().unwrap();
    assert_eq!(operator.kind(), SyntaxKind::RightShift);
    assert_eq!(operator.text(), ">>");
}

#[test]
fn less_than_on_values_stays_relational() {
    let parse = parse_cpp("int a, b, c; bool r = a < b > c;");
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    assert_eq!(count(&parse, SyntaxKind::TemplateId), 0);
    assert_eq!(count(&parse, SyntaxKind::BinaryExpression), 2);
}

#[test]
fn namespaces_and_qualified_definitions() {
    let text = "namespace N { struct S { void f(); }; } void N::S::f() {} namespace M = N;";
    let parse = parse_cpp(text);
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    assert_eq!(
        top_level_kinds(&parse),
        vec![SyntaxKind::NamespaceDefinition, SyntaxKind::FunctionDefinition, SyntaxKind::NamespaceAlias]
    );
    let definition = parse
        .tree()
        .unwrap()
        .declarations()
        .find_map(|decl| match decl {
            Declaration::FunctionDefinition(definition) => Some(definition),
            _ => None,
        })
        .unwrap();
    let name = definition.declarator().unwrap().name().unwrap();
    assert!(name.is_qualified());
    assert_eq!(name.identifier(), "f");
    assert_eq!(name.qualifier().len(), 2);
}

#[test]
fn token_locations_point_at_the_source() {
    let text = "int  value;";
    let parse = parse_cpp(text);
    let token = parse.token_at_source(FileId::MAIN, 6).unwrap();
    assert_eq!(token.text(), "value");
    let location = parse.token_location(&token).unwrap().location;
    assert_eq!(usize::from(location.range.start()), 5);
    assert_eq!(usize::from(location.range.end()), 10);
}

#[test]
fn file_location_covers_a_declaration() {
    let text = "int a;\nint bb = 2;";
    let parse = parse_cpp(text);
    let second = parse.tree().unwrap().declarations().nth(1).unwrap();
    let location = parse.file_location(second.syntax()).unwrap();
    assert_eq!(&text[location.range.start().into()..location.range.end().into()], "int bb = 2;");
}

#[test]
fn debug_tree_lists_nodes_and_tokens() {
    let parse = parse_cpp("int a;");
    let dump = parse.debug_tree();
    assert!(dump.starts_with("TranslationUnit\n"));
    assert!(dump.contains("  SimpleDeclaration\n"));
    assert!(dump.contains("KwInt \"int\""));
}

#[test]
fn recovery_limit_stops_the_parse() {
    let limits = ParseLimits {
        max_recoveries: 2,
        ..ParseLimits::default()
    };
    let parse = parse_file("<main>", "int = ; int = ; int = ; int ok;", &DialectConfig::cpp(), &limits, &NoIncludes).unwrap();
    assert!(parse.diagnostics().iter().filter(|diagnostic| diagnostic.is_error()).count() <= 3);
    assert_eq!(count(&parse, SyntaxKind::SimpleDeclaration), 0);
}

#[test]
fn lambdas_casts_and_new() {
    let text = "struct T { int v; }; void f() { auto g = [](int x) { return x; }; T* t = new T(); int n = static_cast<int>(1.5); delete t; }";
    let parse = parse_cpp(text);
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    assert_eq!(count(&parse, SyntaxKind::LambdaExpression), 1);
    assert_eq!(count(&parse, SyntaxKind::NewExpression), 1);
    assert_eq!(count(&parse, SyntaxKind::NamedCastExpression), 1);
    assert_eq!(count(&parse, SyntaxKind::DeleteExpression), 1);
}

#[test]
fn constructors_keep_the_class_name_a_type() {
    let texts = [
        "struct Y { Y(); Y(const Y&); Y(Y&&); ~Y(); Y& operator=(const Y&); };",
        "template<class T> struct X { X(); X(const X&); X* next; };",
        "class Y { public: Y(); Y(const Y&); static Y make(); };",
        "struct Y { Y() {} Y(int v) : v(v) {} void f() { Y copy; } int v; };",
    ];
    for text in texts {
        let parse = parse_cpp(text);
        assert!(!parse.has_errors(), "{text:?}: {:?}", parse.diagnostics());
    }

    let parse = parse_cpp("struct Y { Y(); Y(const Y&); };");
    let constructors: Vec<_> = declarators(&parse)
        .into_iter()
        .filter(|declarator| declarator.name().is_some_and(|name| name.identifier() == "Y"))
        .collect();
    assert_eq!(constructors.len(), 2);
    assert!(constructors.iter().all(Declarator::is_function));
}

#[test]
fn preprocessor_errors_become_problem_nodes() {
    let parse = parse_text("#include <missing.h>\nint a;\n", &DialectConfig::c()).unwrap();
    assert!(parse.diagnostics().iter().any(|diagnostic| diagnostic.kind == ErrorKind::Preprocessor));
    assert_eq!(top_level_kinds(&parse), vec![SyntaxKind::ProblemDeclaration, SyntaxKind::SimpleDeclaration]);

    let parse = parse_cpp("int b;\n#error boom\nint c;\n");
    assert_eq!(
        top_level_kinds(&parse),
        vec![SyntaxKind::SimpleDeclaration, SyntaxKind::ProblemDeclaration, SyntaxKind::SimpleDeclaration]
    );

    let parse = parse_cpp("void f() {\n#error inside\n int x; }\n#error last\n");
    assert_eq!(count(&parse, SyntaxKind::ProblemStatement), 1);
    assert_eq!(count(&parse, SyntaxKind::DeclarationStatement), 1);
    assert_eq!(top_level_kinds(&parse), vec![SyntaxKind::FunctionDefinition, SyntaxKind::ProblemDeclaration]);

    let clean = parse_cpp("#warning careful\nint d;\n");
    assert_eq!(top_level_kinds(&clean), vec![SyntaxKind::SimpleDeclaration]);
}

/// Parses `text` under both dialects: it must be clean under `enabled` and a
/// syntax error under `disabled`.
fn assert_gated(
    text: &str,
    enabled: &DialectConfig,
    disabled: &DialectConfig,
) -> Parse {
    let accepted = parse_text(text, enabled).unwrap();
    assert!(!accepted.has_errors(), "{text:?}: {:?}", accepted.diagnostics());
    let rejected = parse_text(text, disabled).unwrap();
    assert!(
        rejected
            .diagnostics()
            .iter()
            .any(|diagnostic| matches!(diagnostic.kind, ErrorKind::Syntax | ErrorKind::AmbiguityExhausted)),
        "{text:?} parsed without the extension"
    );
    accepted
}

#[test]
fn gnu_extensions_are_syntax_errors_when_disabled() {
    let gnu = DialectConfig::gnu_c();
    let c = DialectConfig::c();

    let parse = assert_gated("int a; typeof(a) b;", &gnu, &c);
    assert_eq!(count(&parse, SyntaxKind::TypeofSpecifier), 1);

    let parse = assert_gated("__attribute__((unused)) static int x;", &gnu, &c);
    assert_eq!(count(&parse, SyntaxKind::AttributeSpecifier), 1);

    let parse = assert_gated("void outer(void) { int inner(int x) { return x; } inner(1); }", &gnu, &c);
    assert_eq!(count(&parse, SyntaxKind::FunctionDefinition), 2);

    assert_gated("int a, b; int m = a <? b; int n = a >? b;", &gnu, &c);
    assert_gated("int a, b; int m = a <? b;", &DialectConfig::gnu_cpp(), &DialectConfig::cpp());
}

#[test]
fn nested_functions_stay_errors_in_gnu_cpp() {
    let parse = parse_text("void outer() { int inner(int x) { return x; } }", &DialectConfig::gnu_cpp()).unwrap();
    assert!(parse.has_errors());
}

#[test]
fn complex_types_need_c99_or_gnu() {
    let c89 = DialectConfig {
        c99: false,
        ..DialectConfig::c()
    };
    assert_gated("double _Complex z;", &DialectConfig::c(), &c89);
    assert_gated("float _Imaginary w;", &DialectConfig::c(), &c89);
    let gnu89 = DialectConfig {
        c99: false,
        ..DialectConfig::gnu_c()
    };
    assert!(!parse_text("double _Complex z;", &gnu89).unwrap().has_errors());
}
