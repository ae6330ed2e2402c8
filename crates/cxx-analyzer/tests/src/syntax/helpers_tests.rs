use super::*;
use crate::config::DialectConfig;
use crate::parser::parse_text;

fn root(text: &str) -> SyntaxNode {
    parse_text(text, &DialectConfig::cpp()).unwrap().syntax()
}

#[test]
fn compact_text_keeps_words_apart() {
    let tree = root("unsigned   long int  x ;");
    let specifiers = tree.descendants().find(|node| node.kind() == SyntaxKind::DeclSpecifierSeq).unwrap();
    assert_eq!(compact_text(&specifiers), "unsigned long int");
}

#[test]
fn compact_text_joins_punctuation() {
    let tree = root("namespace A { struct B {}; } A :: B * p;");
    let name = tree.descendants().find(|node| node.kind() == SyntaxKind::QualifiedName).unwrap();
    assert_eq!(compact_text(&name), "A::B");
}

#[test]
fn find_ancestor_walks_up() {
    let tree = root("int f() { return 1; }");
    let literal = tree.descendants().find(|node| node.kind() == SyntaxKind::LiteralExpression).unwrap();
    let definition = find_ancestor(literal, SyntaxKind::FunctionDefinition).unwrap();
    assert_eq!(definition.kind(), SyntaxKind::FunctionDefinition);
}

#[test]
fn pick_token_prefers_names() {
    let tree = root("int a;");
    let name = tree.descendants().find(|node| node.kind() == SyntaxKind::Name).unwrap();
    let start = name.text_range().start();
    let token = pick_token(tree.token_at_offset(start)).unwrap();
    assert_eq!(token.text(), "a");
    assert_eq!(name_token(&name).unwrap().text(), "a");
}
