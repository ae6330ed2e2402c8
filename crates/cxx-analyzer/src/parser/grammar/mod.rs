//! The C and C++ grammar, as recursive descent with backtracking.
//!
//! Every production returns `PResult`; a failed production leaves whatever
//! it emitted in place, so callers that try alternatives wrap them in
//! `Parser::speculate`. Errors only become diagnostics at the recovery
//! points: declarations and statements, which are replaced by problem nodes.

mod decl;
mod declarator;
mod expr;
mod names;
mod specifiers;
mod stmt;
mod templates;

use crate::parser::core::{PResult, ParseError, Parser};
use crate::syntax::kind::SyntaxKind;

pub(crate) fn translation_unit(p: &mut Parser<'_>) {
    let m = p.start();
    while !p.at_eof() && !p.stopped() {
        if decl::declaration_with_recovery(p).is_err() {
            break;
        }
    }
    if !p.at_eof() {
        let rest = p.start();
        while !p.at_eof() {
            p.bump();
        }
        rest.complete(p, SyntaxKind::ProblemDeclaration);
    }
    m.complete(p, SyntaxKind::TranslationUnit);
}

/// Runs `f`; if it fails, undoes it, records the error and skips to the next
/// synchronization point inside a problem node of `kind`.
pub(crate) fn recovering<'i>(
    p: &mut Parser<'i>,
    kind: SyntaxKind,
    f: impl FnOnce(&mut Parser<'i>) -> PResult,
) -> PResult {
    let checkpoint = p.checkpoint();
    let error = match f(p) {
        Ok(()) => {
            p.release(checkpoint);
            return Ok(());
        },
        Err(error) => {
            p.rollback(checkpoint);
            error
        },
    };
    recover(p, error, kind);
    Ok(())
}

fn recover(
    p: &mut Parser<'_>,
    error: ParseError,
    kind: SyntaxKind,
) {
    p.record(error);
    p.recoveries += 1;
    let m = p.start();
    if p.recoveries > p.limits.max_recoveries {
        tracing::debug!(limit = p.limits.max_recoveries, "recovery limit reached; skipping the rest of the input");
        while !p.at_eof() {
            p.bump();
        }
    } else {
        skip_to_sync(p);
    }
    m.complete(p, kind);
}

/// Skips past the next `;` or balanced `{...}` block, stopping before a `}`
/// that closes an enclosing construct. Always consumes at least one token.
fn skip_to_sync(p: &mut Parser<'_>) {
    let start = p.position();
    let mut depth = 0usize;
    loop {
        match p.current() {
            SyntaxKind::Eof => break,
            SyntaxKind::Semicolon if depth == 0 => {
                p.bump();
                break;
            },
            SyntaxKind::LBrace => {
                depth += 1;
                p.bump();
            },
            SyntaxKind::RBrace => {
                if depth == 0 {
                    if p.position() == start {
                        p.bump();
                    }
                    break;
                }
                depth -= 1;
                p.bump();
                if depth == 0 {
                    p.eat(SyntaxKind::Semicolon);
                    break;
                }
            },
            _ => p.bump(),
        }
    }
}
