use rowan::{NodeOrToken, TextRange};

use crate::config::ParseLimits;
use crate::ide::{BindingInfo, QueryInput};
use crate::parser::{Parse, TokenLocation};
use crate::semantics::Semantics;
use crate::syntax::cst::SyntaxNode;
use crate::syntax::kind::SyntaxKind;
use crate::vfs::{FileId, FileLocation};

/// The most specific node covering a source span.
#[derive(Debug, Clone)]
pub struct Selection {
    pub node: SyntaxNode,
    pub kind: SyntaxKind,
    /// Source span of the node in the file the selection was made in.
    pub location: FileLocation,
    /// Source text of that span, before macro expansion.
    pub text: String,
    /// Set only when bindings were requested and the node is or sits in a name.
    pub binding: Option<BindingInfo>,
}

/// Selects in a self-contained buffer parsed with the default dialect.
pub fn select_at(
    text: &str,
    start: usize,
    end: usize,
    resolve_bindings: bool,
) -> Option<Selection> {
    select_with(&QueryInput::default(), text, start, end, resolve_bindings)
}

pub fn select_with(
    input: &QueryInput<'_>,
    text: &str,
    start: usize,
    end: usize,
    resolve_bindings: bool,
) -> Option<Selection> {
    let parse = match input.parse(text) {
        Ok(parse) => parse,
        Err(failure) => {
            tracing::debug!(%failure, "selection parse failed");
            return None;
        },
    };
    select_in(&parse, &input.limits, start, end, resolve_bindings)
}

/// Offsets are main-file source offsets; `start > end` is treated as the
/// reversed span.
pub fn select_in(
    parse: &Parse,
    limits: &ParseLimits,
    start: usize,
    end: usize,
    resolve_bindings: bool,
) -> Option<Selection> {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    let range = covered_tree_range(parse, start, end)?;
    let node = match parse.syntax().covering_element(range) {
        NodeOrToken::Node(node) => node,
        NodeOrToken::Token(token) => token.parent()?,
    };
    if node.kind() == SyntaxKind::Error || node.kind().is_problem() {
        tracing::trace!(start, end, "only a problem node covers the selection");
        return None;
    }

    let location = parse.file_location(&node)?;
    let text = parse.sources().slice(location).unwrap_or_default().to_string();
    let binding = if resolve_bindings {
        let semantics = Semantics::with_limits(parse, limits);
        semantics.binding_at(&node).map(|id| BindingInfo::new(&semantics, id, &node))
    } else {
        None
    };
    tracing::debug!(kind = ?node.kind(), start, end, "selected node");
    Some(Selection {
        kind: node.kind(),
        node,
        location,
        text,
        binding,
    })
}

/// Tree range of every token whose source overlaps `[start, end)`. An empty
/// span selects the token it touches.
fn covered_tree_range(
    parse: &Parse,
    start: usize,
    end: usize,
) -> Option<TextRange> {
    if start == end {
        let token = parse.token_at_source(FileId::MAIN, start)?;
        return Some(parse.token_location(&token)?.range);
    }
    let overlaps = |token: &&TokenLocation| {
        let source = token.location.range;
        token.location.file == FileId::MAIN && usize::from(source.start()) < end && start < usize::from(source.end())
    };
    let mut covered = parse.token_locations().iter().filter(overlaps).map(|token| token.range);
    let first = covered.next()?;
    Some(covered.fold(first, |range, next| range.cover(next)))
}
