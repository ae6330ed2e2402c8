/// Token and node utilities over the rowan tree.
use rowan::TokenAtOffset;

use crate::syntax::cst::{SyntaxNode, SyntaxToken};
use crate::syntax::kind::SyntaxKind;

/// Walk ancestors until a node with the given kind is found.
pub fn find_ancestor(
    node: SyntaxNode,
    kind: SyntaxKind,
) -> Option<SyntaxNode> {
    node.ancestors().find(|ancestor| ancestor.kind() == kind)
}

/// Tokens of `node` that are not whitespace or comments.
pub fn significant_tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + use<> {
    node.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| !token.kind().is_trivia())
}

/// First direct child token of `kind`.
pub fn child_token(
    node: &SyntaxNode,
    kind: SyntaxKind,
) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| token.kind() == kind)
}

/// First direct child token that names something.
pub fn name_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| token.kind().is_name_token())
}

/// Source-like text of a node with normalized spacing: tokens are joined
/// directly unless two word characters would run together.
pub fn compact_text(node: &SyntaxNode) -> String {
    let mut out = String::new();
    for token in significant_tokens(node) {
        let text = token.text();
        let needs_space = out.chars().last().is_some_and(is_word_char) && text.chars().next().is_some_and(is_word_char);
        if needs_space {
            out.push(' ');
        }
        out.push_str(text);
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Prefer the name token when the offset sits between two tokens.
pub fn pick_token(tokens: TokenAtOffset<SyntaxToken>) -> Option<SyntaxToken> {
    tokens.max_by_key(|token| match token.kind() {
        SyntaxKind::Ident | SyntaxKind::CompletionName => 3,
        kind if kind.is_keyword() => 2,
        SyntaxKind::Integer | SyntaxKind::Float | SyntaxKind::String | SyntaxKind::Char => 1,
        _ => 0,
    })
}

#[cfg(test)]
#[path = "../../tests/src/syntax/helpers_tests.rs"]
mod tests;
