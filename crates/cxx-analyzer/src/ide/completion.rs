use crate::config::{DialectConfig, ParseLimits};
use crate::ide::{BindingInfo, QueryInput};
use crate::parser::{Parse, parse_preprocessed};
use crate::pp::MacroTable;
use crate::semantics::{BindingId, BindingKind, ScopeId, ScopeKind, Semantics};
use crate::syntax::ast::{AstNode, FieldReference, NameRef, QualifiedName};
use crate::syntax::cst::SyntaxNode;
use crate::syntax::kind::SyntaxKind;

/// What precedes the identifier being completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// `object.` or `pointer->`; `class` is `None` when the receiver has no
    /// class type.
    Member {
        arrow: bool,
        class: Option<String>,
    },
    /// `qualifier::`, or `::` alone for the global namespace.
    Qualified {
        qualifier: String,
    },
    Unqualified,
}

/// Result of a completion query at a caret.
#[derive(Debug, Clone)]
pub struct CompletionNode {
    pub offset: usize,
    /// The identifier characters between the start of the word and the caret.
    pub prefix: String,
    pub context: CompletionContext,
    /// Innermost scope around the caret.
    pub scope: ScopeId,
    pub scope_kind: ScopeKind,
    /// Bindings whose name starts with the prefix, innermost first.
    pub candidates: Vec<BindingInfo>,
    /// Macros defined before the caret whose name starts with the prefix,
    /// sorted; only offered in unqualified contexts.
    pub macros: Vec<String>,
}

impl CompletionNode {
    fn empty(offset: usize) -> Self {
        Self {
            offset,
            prefix: String::new(),
            context: CompletionContext::Unqualified,
            scope: ScopeId::GLOBAL,
            scope_kind: ScopeKind::Global,
            candidates: Vec::new(),
            macros: Vec::new(),
        }
    }

    pub fn candidate_names(&self) -> Vec<&str> {
        self.candidates.iter().map(|candidate| candidate.name.as_str()).collect()
    }
}

/// Completes in a self-contained buffer parsed with the default dialect.
pub fn complete_at(
    text: &str,
    offset: usize,
) -> CompletionNode {
    complete_with(&QueryInput::default(), text, offset)
}

/// Parses tolerantly up to `offset`, whatever the configured recovery mode.
///
/// Inside a class body the buffer is parsed a second time in full, with an
/// anchor identifier at the caret, so that members declared after the caret
/// are offered too.
pub fn complete_with(
    input: &QueryInput<'_>,
    text: &str,
    offset: usize,
) -> CompletionNode {
    let offset = floor_char_boundary(text, offset);
    let dialect = DialectConfig {
        strict_recovery: false,
        ..input.dialect
    };
    let preprocessed = input.preprocessor(text, &dialect).with_completion(offset).run();
    let parse = match parse_preprocessed(preprocessed, &dialect, &input.limits) {
        Ok(parse) => parse,
        Err(failure) => {
            tracing::warn!(%failure, "tolerant completion parse failed");
            return CompletionNode::empty(offset);
        },
    };
    let (node, in_class) = complete_parsed(&parse, &input.limits, offset);
    if !in_class || node.context != CompletionContext::Unqualified {
        return node;
    }
    complete_whole_body(input, &dialect, text, offset, &node).unwrap_or(node)
}

/// Completes in a parse produced with a completion token, as
/// [`complete_with`] does.
pub fn complete_in(
    parse: &Parse,
    limits: &ParseLimits,
    offset: usize,
) -> CompletionNode {
    complete_parsed(parse, limits, offset).0
}

/// The completion and whether the caret is inside a class body.
fn complete_parsed(
    parse: &Parse,
    limits: &ParseLimits,
    offset: usize,
) -> (CompletionNode, bool) {
    let root = parse.syntax();
    let Some(token) = root
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| token.kind() == SyntaxKind::CompletionName)
    else {
        tracing::debug!(offset, "no completion token in the tree");
        return (CompletionNode::empty(offset), false);
    };
    let Some(name) = token.parent() else {
        return (CompletionNode::empty(offset), false);
    };

    let semantics = Semantics::with_limits(parse, limits);
    let scope = semantics.scope_of(&name);
    let in_class = semantics
        .scopes()
        .ancestors(scope)
        .any(|ancestor| semantics.scopes().get(ancestor).kind == ScopeKind::Class);
    let (context, found) = candidates(&semantics, &name, scope);
    let query = Query {
        semantics: &semantics,
        macros: parse.macros(),
        name: &name,
        prefix: token.text().to_string(),
        offset,
    };
    (query.finish(context, scope, found, None), in_class)
}

const ANCHOR: &str = "__cxx_analyzer_completion__";

/// Completion over the whole buffer with the caret word extended by
/// [`ANCHOR`]; `None` when recovery lost the anchor or it lands in another
/// kind of context.
fn complete_whole_body(
    input: &QueryInput<'_>,
    dialect: &DialectConfig,
    text: &str,
    offset: usize,
    truncated: &CompletionNode,
) -> Option<CompletionNode> {
    let mut anchored = String::with_capacity(text.len() + ANCHOR.len() + 1);
    anchored.push_str(&text[..offset]);
    anchored.push_str(ANCHOR);
    anchored.push(';');
    anchored.push_str(&text[offset..]);

    let parse = parse_preprocessed(input.preprocessor(&anchored, dialect).run(), dialect, &input.limits).ok()?;
    let anchor = format!("{}{ANCHOR}", truncated.prefix);
    let name = parse
        .syntax()
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| token.kind() == SyntaxKind::Ident && token.text() == anchor)?
        .parent()
        .filter(|node| node.kind() == SyntaxKind::Name)?;

    let semantics = Semantics::with_limits(&parse, &input.limits);
    let scope = semantics.scope_of(&name);
    let (context, found) = candidates(&semantics, &name, scope);
    if context != CompletionContext::Unqualified {
        tracing::debug!(offset, "anchored completion changed context");
        return None;
    }
    let no_macros = MacroTable::new();
    let query = Query {
        semantics: &semantics,
        macros: &no_macros,
        name: &name,
        prefix: truncated.prefix.clone(),
        offset,
    };
    Some(query.finish(context, scope, found, Some((&anchor, truncated.macros.clone()))))
}

struct Query<'a> {
    semantics: &'a Semantics,
    macros: &'a MacroTable,
    name: &'a SyntaxNode,
    prefix: String,
    offset: usize,
}

impl Query<'_> {
    /// Filters `found` by the prefix. `anchored` names the anchor identifier
    /// to leave out and carries the macros of the truncated parse.
    fn finish(
        self,
        context: CompletionContext,
        scope: ScopeId,
        found: Vec<BindingId>,
        anchored: Option<(&str, Vec<String>)>,
    ) -> CompletionNode {
        let semantics = self.semantics;
        let prefix = self.prefix;
        let own = semantics.declared_binding(self.name);
        let anchor = anchored.as_ref().map(|(anchor, _)| *anchor);
        let builtins = prefix.starts_with("__");
        let member = matches!(context, CompletionContext::Member { .. });

        let mut accepted: Vec<BindingId> = Vec::new();
        for id in found {
            if Some(id) == own || accepted.contains(&id) {
                continue;
            }
            let offered = semantics.with_binding(id, |binding| {
                binding.name.starts_with(&prefix)
                    && Some(binding.name.as_str()) != anchor
                    && !binding.is_problem()
                    && !binding.is_anonymous()
                    && (builtins || !binding.builtin)
                    && !matches!(binding.kind, BindingKind::Constructor | BindingKind::Destructor)
                    && !(member && binding.kind.is_type())
            });
            if offered {
                accepted.push(id);
            }
        }

        let macros = match (&context, anchored) {
            (_, Some((_, macros))) => macros,
            (CompletionContext::Unqualified, None) => {
                let mut names: Vec<String> = self
                    .macros
                    .iter()
                    .filter(|mac| mac.builtin.is_none() && mac.name.starts_with(&prefix))
                    .map(|mac| mac.name.to_string())
                    .collect();
                names.sort_unstable();
                names
            },
            _ => Vec::new(),
        };

        tracing::debug!(
            offset = self.offset,
            prefix = %prefix,
            candidates = accepted.len(),
            macros = macros.len(),
            "completed"
        );
        CompletionNode {
            offset: self.offset,
            prefix,
            context,
            scope,
            scope_kind: semantics.scopes().get(scope).kind,
            candidates: accepted.into_iter().map(|id| BindingInfo::new(semantics, id, self.name)).collect(),
            macros,
        }
    }
}

/// Candidate bindings for the completion name node `name`, before filtering.
fn candidates(
    semantics: &Semantics,
    name: &SyntaxNode,
    scope: ScopeId,
) -> (CompletionContext, Vec<BindingId>) {
    let qualified = name.parent().and_then(QualifiedName::cast);
    if let Some(qualified) = &qualified {
        let previous = qualified
            .syntax()
            .children()
            .take_while(|child| child != name)
            .filter_map(NameRef::cast)
            .last();
        match previous {
            Some(qualifier) => {
                let id = semantics.resolve(&qualifier);
                let context = CompletionContext::Qualified {
                    qualifier: qualifier.text(),
                };
                if semantics.with_binding(id, |binding| binding.is_problem()) {
                    return (context, Vec::new());
                }
                return (context, semantics.qualified_members(id));
            },
            None if qualified.is_global() => {
                let context = CompletionContext::Qualified {
                    qualifier: String::new(),
                };
                return (context, semantics.visible_bindings(ScopeId::GLOBAL, name.text_range().start()));
            },
            None => {},
        }
    }

    let member = qualified.as_ref().map_or_else(|| name.clone(), |qualified| qualified.syntax().clone());
    if let Some(field) = member.parent().and_then(FieldReference::cast)
        && field.member().is_some_and(|accessed| accessed.syntax() == &member)
    {
        let class = semantics.accessed_class(&field);
        let context = CompletionContext::Member {
            arrow: field.is_arrow(),
            class: class.map(|class| semantics.qualified_name(class)),
        };
        let members = class.map(|class| semantics.member_bindings(class)).unwrap_or_default();
        return (context, members);
    }

    (CompletionContext::Unqualified, semantics.visible_bindings(scope, name.text_range().start()))
}

fn floor_char_boundary(
    text: &str,
    offset: usize,
) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
