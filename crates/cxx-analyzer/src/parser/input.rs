use std::sync::Arc;

use crate::config::DialectConfig;
use crate::pp::{ExpansionId, PpToken};
use crate::syntax::kind::SyntaxKind;
use crate::syntax::queries;
use crate::vfs::FileLocation;

/// A token as the parser sees it: keywords classified, `>>` split in two.
#[derive(Debug, Clone)]
pub(crate) struct InputToken {
    pub(crate) kind: SyntaxKind,
    pub(crate) text: Arc<str>,
    pub(crate) location: FileLocation,
    pub(crate) expansion: Option<ExpansionId>,
    pub(crate) leading_space: bool,
    pub(crate) at_line_start: bool,
    /// Followed by the other half of a split `>>` or `>>=`.
    pub(crate) joint: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Input {
    tokens: Vec<InputToken>,
    completion: Option<usize>,
}

impl Input {
    pub(crate) fn new(
        tokens: &[PpToken],
        dialect: &DialectConfig,
    ) -> Self {
        let mut input = Self {
            tokens: Vec::with_capacity(tokens.len()),
            completion: None,
        };
        for token in tokens {
            let kind = match token.kind {
                SyntaxKind::Ident => queries::keyword_kind(&token.text, dialect).unwrap_or(SyntaxKind::Ident),
                kind => kind,
            };
            let mut entry = InputToken {
                kind,
                text: Arc::clone(&token.text),
                location: token.location,
                expansion: token.expansion,
                leading_space: token.leading_space,
                at_line_start: token.at_line_start,
                joint: false,
            };
            // Nested template argument lists close with `>>`, so the
            // shift operators are recombined by the expression grammar.
            let second = match kind {
                SyntaxKind::RightShift => Some((SyntaxKind::Greater, ">")),
                SyntaxKind::RightShiftEqual => Some((SyntaxKind::GreaterEqual, ">=")),
                _ => None,
            };
            if let Some((second_kind, second_text)) = second {
                entry.kind = SyntaxKind::Greater;
                entry.text = Arc::from(">");
                entry.joint = true;
                input.tokens.push(entry.clone());
                input.tokens.push(InputToken {
                    kind: second_kind,
                    text: Arc::from(second_text),
                    leading_space: false,
                    at_line_start: false,
                    joint: false,
                    ..entry
                });
                continue;
            }
            if kind == SyntaxKind::CompletionName {
                input.completion = Some(input.tokens.len());
            }
            input.tokens.push(entry);
        }
        input
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens.len()
    }

    pub(crate) fn kind(
        &self,
        index: usize,
    ) -> SyntaxKind {
        self.tokens.get(index).map_or(SyntaxKind::Eof, |token| token.kind)
    }

    pub(crate) fn text(
        &self,
        index: usize,
    ) -> &str {
        self.tokens.get(index).map_or("", |token| &token.text)
    }

    pub(crate) fn token(
        &self,
        index: usize,
    ) -> Option<&InputToken> {
        self.tokens.get(index)
    }

    pub(crate) fn is_joint(
        &self,
        index: usize,
    ) -> bool {
        self.tokens.get(index).is_some_and(|token| token.joint)
    }

    /// Index of the completion token, if the input ends in one.
    pub(crate) fn completion(&self) -> Option<usize> {
        self.completion
    }

    /// Location used for diagnostics at `index`; the end of the last token past the end.
    pub(crate) fn location(
        &self,
        index: usize,
    ) -> Option<FileLocation> {
        if let Some(token) = self.tokens.get(index) {
            return Some(token.location);
        }
        let last = self.tokens.last()?;
        let end = last.location.range.end();
        Some(FileLocation::new(last.location.file, rowan::TextRange::empty(end)))
    }
}

/// Input positions of the preprocessed token indices `sites`, given in
/// ascending order. Every `>>` or `>>=` before a site is split in two.
pub(crate) fn input_positions(
    tokens: &[PpToken],
    sites: &[usize],
) -> Vec<usize> {
    let mut positions = Vec::with_capacity(sites.len());
    let mut split = 0;
    let mut next = 0;
    for &site in sites {
        while next < site.min(tokens.len()) {
            if matches!(tokens[next].kind, SyntaxKind::RightShift | SyntaxKind::RightShiftEqual) {
                split += 1;
            }
            next += 1;
        }
        positions.push(site + split);
    }
    positions
}
