use std::fmt;
use std::sync::Arc;

use rowan::{TextRange, TextSize};

use crate::pp::trigraph::OffsetMap;
use crate::syntax::kind::SyntaxKind;
use crate::syntax::lexer::Lexer;
use crate::vfs::{FileId, FileLocation};

/// A preprocessing token.
///
/// `location` always points at original source text: tokens produced by a
/// macro body carry the location of the invocation, argument tokens keep
/// their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpToken {
    pub kind: SyntaxKind,
    pub text: Arc<str>,
    pub location: FileLocation,
    /// Innermost macro expansion that produced this token.
    pub expansion: Option<ExpansionId>,
    pub leading_space: bool,
    /// First token on its source line; only meaningful for file tokens.
    pub at_line_start: bool,
    /// Names an active macro at the point it was scanned; never expanded.
    pub painted: bool,
}

impl PpToken {
    pub fn new(
        kind: SyntaxKind,
        text: impl Into<Arc<str>>,
        location: FileLocation,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
            expansion: None,
            leading_space: false,
            at_line_start: false,
            painted: false,
        }
    }

    pub fn is(
        &self,
        kind: SyntaxKind,
    ) -> bool {
        self.kind == kind
    }

    pub fn is_ident(
        &self,
        text: &str,
    ) -> bool {
        self.kind == SyntaxKind::Ident && &*self.text == text
    }

    /// Same spelling and spacing, ignoring where the token came from.
    pub(crate) fn same_spelling(
        &self,
        other: &PpToken,
    ) -> bool {
        self.kind == other.kind && self.text == other.text && self.leading_space == other.leading_space
    }
}

impl fmt::Display for PpToken {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpansionId(u32);

impl ExpansionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One macro invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub macro_name: Arc<str>,
    pub call_site: FileLocation,
    /// Expansion whose rescan produced the invocation, if any.
    pub parent: Option<ExpansionId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionTable {
    expansions: Vec<Expansion>,
}

impl ExpansionTable {
    pub(crate) fn push(
        &mut self,
        expansion: Expansion,
    ) -> ExpansionId {
        let id = ExpansionId(self.expansions.len() as u32);
        self.expansions.push(expansion);
        id
    }

    pub fn get(
        &self,
        id: ExpansionId,
    ) -> Option<&Expansion> {
        self.expansions.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.expansions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expansions.is_empty()
    }

    /// Macro names from the innermost expansion outwards.
    pub fn chain(
        &self,
        id: ExpansionId,
    ) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(expansion) = current.and_then(|id| self.get(id)) {
            names.push(&*expansion.macro_name);
            current = expansion.parent;
        }
        names
    }
}

/// A file's tokens, without newlines and comments.
///
/// Lexing runs on `text` (already normalized when trigraphs are enabled);
/// `offsets` maps token ranges back to the original file.
pub(crate) fn lex_file(
    file: FileId,
    text: &str,
    offsets: &OffsetMap,
) -> Vec<PpToken> {
    let mut tokens = Vec::new();
    let mut leading_space = false;
    let mut at_line_start = true;

    for lexed in Lexer::new(text) {
        match lexed.kind {
            SyntaxKind::Newline => {
                at_line_start = true;
                leading_space = false;
            },
            SyntaxKind::Whitespace | SyntaxKind::Comment => {
                leading_space = true;
            },
            kind => {
                let range = TextRange::at(TextSize::from(lexed.offset as u32), TextSize::of(lexed.text));
                let mut token =
                    PpToken::new(kind, lexed.text, FileLocation::new(file, offsets.range_to_original(range)));
                token.leading_space = leading_space;
                token.at_line_start = at_line_start;
                tokens.push(token);
                leading_space = false;
                at_line_start = false;
            },
        }
    }
    tokens
}

/// Message for an `Error` token, derived from its spelling.
pub(crate) fn lex_error_message(text: &str) -> &'static str {
    let body = text.trim_start_matches(['u', 'U', 'L', '8', 'R']);
    if text.starts_with("/*") {
        "unterminated comment"
    } else if body.starts_with('\'') {
        "unterminated character literal"
    } else if text.contains('R') && body.starts_with('"') {
        "unterminated raw string literal"
    } else if body.starts_with('"') {
        "unterminated string literal"
    } else {
        "invalid character"
    }
}

/// Body of a string literal with escapes for `"` and `\` undone.
pub(crate) fn destringize(text: &str) -> Option<String> {
    let start = text.find('"')?;
    let inner = text.get(start + 1..text.len().checked_sub(1)?)?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\'
            && let Some(next) = chars.clone().next()
            && (next == '"' || next == '\\')
        {
            out.push(next);
            chars.next();
            continue;
        }
        out.push(ch);
    }
    Some(out)
}

/// Spells `tokens` as a string literal for the `#` operator.
pub(crate) fn stringize(tokens: &[PpToken]) -> String {
    let mut out = String::from("\"");
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && token.leading_space {
            out.push(' ');
        }
        if matches!(token.kind, SyntaxKind::String | SyntaxKind::Char)
            || (token.kind == SyntaxKind::Error && (token.text.contains('"') || token.text.contains('\'')))
        {
            for ch in token.text.chars() {
                if ch == '"' || ch == '\\' {
                    out.push('\\');
                }
                out.push(ch);
            }
        } else {
            out.push_str(&token.text);
        }
    }
    out.push('"');
    out
}

/// Spells tokens back as source text, one space where a token had leading space.
pub fn spell(tokens: &[PpToken]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && token.leading_space {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    out
}
