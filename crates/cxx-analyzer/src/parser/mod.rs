//! Parser: preprocessed tokens to a lossless C/C++ syntax tree.
//!
//! The grammar runs over the expanded token stream, recording events that
//! are turned into a rowan tree afterwards. Each tree token keeps a
//! [`TokenLocation`] pointing back at the source that produced it.

pub(crate) mod core;
mod event;
mod grammar;
mod input;
pub(crate) mod oracle;

pub use event::TokenLocation;

use rowan::{GreenNode, TextSize};

use crate::config::{DialectConfig, ParseLimits};
use crate::diagnostics::{Diagnostic, ParseFailure, Severity};
use crate::pp::{ExpansionTable, IncludeResolver, MacroTable, NoIncludes, Preprocessed, Preprocessor};
use crate::syntax::ast::{AstNode, TranslationUnit};
use crate::syntax::cst::{SyntaxNode, SyntaxToken};
use crate::vfs::{FileId, FileLocation, SourceMap};

use self::core::Parser;
use self::input::{Input, input_positions};

/// A parsed translation unit. Cheap to share between threads; syntax nodes
/// are materialized on demand from the green tree.
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    tokens: Vec<TokenLocation>,
    diagnostics: Vec<Diagnostic>,
    sources: SourceMap,
    expansions: ExpansionTable,
    macros: MacroTable,
    dialect: DialectConfig,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn tree(&self) -> Option<TranslationUnit> {
        TranslationUnit::cast(self.syntax())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn expansions(&self) -> &ExpansionTable {
        &self.expansions
    }

    /// Macros defined at the end of the main file.
    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn dialect(&self) -> &DialectConfig {
        &self.dialect
    }

    /// Source locations of all tree tokens, in tree order.
    pub fn token_locations(&self) -> &[TokenLocation] {
        &self.tokens
    }

    pub fn token_location(
        &self,
        token: &SyntaxToken,
    ) -> Option<&TokenLocation> {
        if token.kind().is_trivia() {
            return None;
        }
        let start = token.text_range().start();
        let index = self.tokens.binary_search_by_key(&start, |location| location.range.start()).ok()?;
        self.tokens.get(index)
    }

    /// Source range covered by a node, from its first to its last token.
    /// Tokens from other files than the first one are ignored.
    pub fn file_location(
        &self,
        node: &SyntaxNode,
    ) -> Option<FileLocation> {
        let mut tokens = node
            .descendants_with_tokens()
            .filter_map(|element| element.into_token())
            .filter_map(|token| self.token_location(&token).copied());
        let first = tokens.next()?;
        let last = tokens.filter(|location| location.location.file == first.location.file).last();
        Some(match last {
            Some(last) => first.location.cover(last.location),
            None => first.location,
        })
    }

    /// Tree token produced by the source text at `offset` of `file`. Tokens
    /// written directly in the file are preferred over macro expansions.
    pub fn token_at_source(
        &self,
        file: FileId,
        offset: usize,
    ) -> Option<SyntaxToken> {
        let offset = TextSize::try_from(offset).ok()?;
        let covering = |location: &&TokenLocation| {
            location.location.file == file
                && location.location.range.start() <= offset
                && offset <= location.location.range.end()
        };
        let chosen = self
            .tokens
            .iter()
            .filter(covering)
            .min_by_key(|location| (location.expansion.is_some(), location.location.range.len()))?;
        let root = self.syntax();
        match root.token_at_offset(chosen.range.start()) {
            rowan::TokenAtOffset::None => None,
            rowan::TokenAtOffset::Single(token) => Some(token),
            rowan::TokenAtOffset::Between(_, right) => Some(right),
        }
    }

    /// Indented dump of the tree, one node or token per line.
    pub fn debug_tree(&self) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        for event in self.syntax().preorder_with_tokens() {
            match event {
                rowan::WalkEvent::Enter(element) => {
                    if !element.kind().is_trivia() {
                        out.push_str(&"  ".repeat(depth));
                        match &element {
                            rowan::NodeOrToken::Node(node) => out.push_str(&format!("{:?}\n", node.kind())),
                            rowan::NodeOrToken::Token(token) => {
                                out.push_str(&format!("{:?} {:?}\n", token.kind(), token.text()));
                            },
                        }
                    }
                    if element.as_node().is_some() {
                        depth += 1;
                    }
                },
                rowan::WalkEvent::Leave(element) => {
                    if element.as_node().is_some() {
                        depth = depth.saturating_sub(1);
                    }
                },
            }
        }
        out
    }
}

/// Parses already preprocessed tokens.
pub fn parse_preprocessed(
    preprocessed: Preprocessed,
    dialect: &DialectConfig,
    limits: &ParseLimits,
) -> Result<Parse, ParseFailure> {
    let _span = tracing::debug_span!("parse", tokens = preprocessed.tokens.len()).entered();
    let input = Input::new(&preprocessed.tokens, dialect);
    let mut parser = Parser::new(&input, dialect, limits);
    grammar::translation_unit(&mut parser);
    let (events, errors) = parser.finish();

    let problems = input_positions(&preprocessed.tokens, &preprocessed.problems);
    let mut diagnostics = preprocessed.diagnostics;
    for error in errors {
        diagnostics.push(Diagnostic::error(error.kind, error.message, input.location(error.pos)));
    }

    if dialect.strict_recovery
        && let Some(first) = diagnostics.iter().find(|diagnostic| diagnostic.severity >= Severity::Error)
    {
        tracing::debug!(%first, "strict parse failed");
        return Err(ParseFailure::from_first_error(first));
    }

    let (green, tokens) = event::build_tree(&input, events, &problems);
    tracing::debug!(
        nodes = green.children().len(),
        diagnostics = diagnostics.len(),
        "parsed translation unit"
    );
    Ok(Parse {
        green,
        tokens,
        diagnostics,
        sources: preprocessed.sources,
        expansions: preprocessed.expansions,
        macros: preprocessed.macros,
        dialect: *dialect,
    })
}

/// Preprocesses and parses `text` as a main file named `path`.
pub fn parse_file(
    path: &str,
    text: &str,
    dialect: &DialectConfig,
    limits: &ParseLimits,
    resolver: &dyn IncludeResolver,
) -> Result<Parse, ParseFailure> {
    let preprocessed = Preprocessor::new(path, text, dialect, resolver).with_limits(*limits).run();
    parse_preprocessed(preprocessed, dialect, limits)
}

/// Parses a self-contained buffer with default limits and no include paths.
pub fn parse_text(
    text: &str,
    dialect: &DialectConfig,
) -> Result<Parse, ParseFailure> {
    parse_file("<main>", text, dialect, &ParseLimits::default(), &NoIncludes)
}

#[cfg(test)]
#[path = "../../tests/src/parser/parser_tests.rs"]
mod tests;
