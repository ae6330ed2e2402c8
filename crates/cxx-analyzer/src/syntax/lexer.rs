use crate::syntax::kind::{SyntaxKind, TokenKind};
use logos::Logos;

/// One lexed token with its byte offset in the lexed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexedToken<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: usize,
    /// Set for malformed tokens, which carry `SyntaxKind::Error`.
    pub error: Option<&'static str>,
}

/// A lexer that wraps `logos::Lexer` to produce `SyntaxKind` tokens.
///
/// Keywords are not recognised here: every identifier-like word is an
/// `Ident`, and the parser classifies keywords under its dialect.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexedToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token_result = self.inner.next()?;
        let text = self.inner.slice();
        let offset = self.inner.span().start;

        let (kind, error) = match token_result {
            Ok(token) => (token.to_syntax(text), token.error_message()),
            Err(()) => {
                let message = if text.contains('"') {
                    "unterminated raw string literal"
                } else {
                    "invalid character"
                };
                (SyntaxKind::Error, Some(message))
            },
        };

        Some(LexedToken {
            kind,
            text,
            offset,
            error,
        })
    }
}

/// Lexes `text` and returns the single token it forms, if it forms exactly one.
pub fn lex_single(text: &str) -> Option<SyntaxKind> {
    let mut lexer = Lexer::new(text);
    let first = lexer.next()?;
    if first.error.is_some() || first.kind.is_trivia() || lexer.next().is_some() {
        return None;
    }
    Some(first.kind)
}

#[cfg(test)]
#[path = "../../tests/src/syntax/lexer_tests.rs"]
mod tests;
