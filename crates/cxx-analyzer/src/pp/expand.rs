use std::sync::Arc;

use crate::pp::token::{self, PpToken, stringize};
use crate::pp::{Builtin, Context, Expansion, ExpansionId, Macro, Preprocessor};
use crate::syntax::kind::SyntaxKind;
use crate::syntax::lexer::lex_single;

/// Replacement list element before `##` is applied.
#[derive(Debug)]
enum Piece {
    Token(PpToken),
    /// Stands in for an empty argument next to `##`.
    Placemarker,
    Paste,
}

impl<'r> Preprocessor<'r> {
    /// Next fully expanded token.
    ///
    /// Returns `None` at the end of the translation unit, or at the end of
    /// the argument being pre-expanded.
    pub(super) fn next_expanded(&mut self) -> Option<PpToken> {
        loop {
            let mut token = self.next_raw(true)?;
            if token.kind != SyntaxKind::Ident || token.painted {
                return Some(token);
            }
            if &*token.text == "_Pragma" {
                self.pragma_operator(&token);
                continue;
            }
            let Some(mac) = self.macros.get(&token.text).cloned() else {
                return Some(token);
            };
            if self.is_active(&token.text) {
                token.painted = true;
                return Some(token);
            }
            if self.budget_exhausted {
                return Some(token);
            }
            match mac.builtin {
                Some(Builtin::File) => return Some(self.file_token(&token)),
                Some(Builtin::Line) => return Some(self.line_token(&token)),
                _ => {},
            }

            if !mac.is_function_like() {
                self.expand_object(&token, &mac);
                continue;
            }
            match self.collect_arguments(&token, &mac) {
                Invocation::NotCalled => return Some(token),
                Invocation::Malformed => {
                    token.painted = true;
                    return Some(token);
                },
                Invocation::Called(args) => self.expand_function(&token, &mac, args),
            }
        }
    }

    /// Fully expands `tokens` in isolation; reading stops at their end.
    pub(super) fn pre_expand(
        &mut self,
        tokens: Vec<PpToken>,
    ) -> Vec<PpToken> {
        let needs_expansion = tokens.iter().any(|token| {
            token.kind == SyntaxKind::Ident
                && !token.painted
                && (self.macros.contains(&token.text) || &*token.text == "_Pragma")
        });
        if !needs_expansion {
            return tokens;
        }

        self.contexts.push(Context {
            tokens,
            pos: 0,
            macro_name: None,
            barrier: true,
        });
        let depth = self.contexts.len();
        let mut out = Vec::new();
        while let Some(token) = self.next_expanded() {
            out.push(token);
        }
        debug_assert_eq!(self.contexts.len(), depth);
        self.contexts.pop();
        out
    }

    fn record_expansion(
        &mut self,
        name: &PpToken,
    ) -> ExpansionId {
        self.expansions.push(Expansion {
            macro_name: Arc::clone(&name.text),
            call_site: name.location,
            parent: name.expansion,
        })
    }

    fn relocated(
        &self,
        mut token: PpToken,
        name: &PpToken,
        id: ExpansionId,
    ) -> PpToken {
        token.location = name.location;
        token.expansion = Some(id);
        token.at_line_start = false;
        token
    }

    fn expand_object(
        &mut self,
        name: &PpToken,
        mac: &Macro,
    ) {
        let id = self.record_expansion(name);
        let has_paste = mac.replacement.iter().any(|token| token.kind == SyntaxKind::HashHash);
        let body = if has_paste {
            let pieces = mac
                .replacement
                .iter()
                .map(|token| match token.kind {
                    SyntaxKind::HashHash => Piece::Paste,
                    _ => Piece::Token(self.relocated(token.clone(), name, id)),
                })
                .collect();
            self.paste(pieces)
        } else {
            mac.replacement.iter().map(|token| self.relocated(token.clone(), name, id)).collect()
        };
        self.push_expansion(name, mac, body);
    }

    fn expand_function(
        &mut self,
        name: &PpToken,
        mac: &Macro,
        args: Vec<Vec<PpToken>>,
    ) {
        let id = self.record_expansion(name);
        let pieces = self.substitute(name, mac, &args, id);
        let body = self.paste(pieces);
        self.push_expansion(name, mac, body);
    }

    fn push_expansion(
        &mut self,
        name: &PpToken,
        mac: &Macro,
        mut body: Vec<PpToken>,
    ) {
        self.expanded_tokens += body.len();
        if self.expanded_tokens > self.limits.max_expanded_tokens {
            self.budget_exhausted = true;
            self.error(
                format!(
                    "macro expansion exceeds the limit of {} tokens; further macros are left unexpanded",
                    self.limits.max_expanded_tokens
                ),
                Some(name.location),
            );
            return;
        }
        if let Some(first) = body.first_mut() {
            first.leading_space = name.leading_space;
            first.at_line_start = name.at_line_start;
        }
        self.contexts.push(Context {
            tokens: body,
            pos: 0,
            macro_name: Some(Arc::clone(&mac.name)),
            barrier: false,
        });
    }

    /// Reads `( args )` after a function-like macro name.
    fn collect_arguments(
        &mut self,
        name: &PpToken,
        mac: &Macro,
    ) -> Invocation {
        match self.next_raw(false) {
            Some(token) if token.kind == SyntaxKind::LParen => {},
            Some(token) => {
                self.push_back(vec![token]);
                return Invocation::NotCalled;
            },
            None => return Invocation::NotCalled,
        }

        let param_count = mac.params.as_ref().map_or(0, Vec::len);
        let mut args: Vec<Vec<PpToken>> = vec![Vec::new()];
        let mut depth = 0usize;
        loop {
            let Some(mut token) = self.next_raw(false) else {
                self.error(format!("unterminated argument list invoking macro \"{}\"", mac.name), Some(name.location));
                return Invocation::Malformed;
            };
            match token.kind {
                SyntaxKind::LParen => depth += 1,
                SyntaxKind::RParen if depth == 0 => break,
                SyntaxKind::RParen => depth -= 1,
                SyntaxKind::Comma if depth == 0 && !(mac.variadic && args.len() == param_count) => {
                    args.push(Vec::new());
                    continue;
                },
                _ => {},
            }
            if let Some(arg) = args.last_mut() {
                token.at_line_start = false;
                arg.push(token);
            }
        }

        if param_count == 0 {
            if args.len() == 1 && args[0].is_empty() {
                return Invocation::Called(Vec::new());
            }
            self.error(
                format!("macro \"{}\" passed {} arguments, but takes just 0", mac.name, args.len()),
                Some(name.location),
            );
            return Invocation::Malformed;
        }
        if args.len() + 1 == param_count && mac.variadic {
            args.push(Vec::new());
        }
        if args.len() < param_count {
            self.error(
                format!(
                    "macro \"{}\" requires {} arguments, but only {} given",
                    mac.name,
                    param_count,
                    args.len()
                ),
                Some(name.location),
            );
            return Invocation::Malformed;
        }
        if args.len() > param_count {
            self.error(
                format!("macro \"{}\" passed {} arguments, but takes just {}", mac.name, args.len(), param_count),
                Some(name.location),
            );
            return Invocation::Malformed;
        }
        Invocation::Called(args)
    }

    /// Replaces parameters in the replacement list; `##` is applied afterwards.
    fn substitute(
        &mut self,
        name: &PpToken,
        mac: &Macro,
        args: &[Vec<PpToken>],
        id: ExpansionId,
    ) -> Vec<Piece> {
        let body = &mac.replacement;
        let mut expanded: Vec<Option<Vec<PpToken>>> = vec![None; args.len()];
        let mut pieces = Vec::with_capacity(body.len());
        let mut i = 0;

        while i < body.len() {
            let token = &body[i];

            if token.kind == SyntaxKind::Hash
                && let Some(param) = body.get(i + 1).and_then(|next| self.param_of(mac, next))
            {
                let location = name.location;
                let mut string = PpToken::new(SyntaxKind::String, stringize(&args[param]), location);
                string.expansion = Some(id);
                string.leading_space = token.leading_space;
                pieces.push(Piece::Token(string));
                i += 2;
                continue;
            }

            if token.kind == SyntaxKind::HashHash {
                pieces.push(Piece::Paste);
                i += 1;
                continue;
            }

            // GNU `, ## __VA_ARGS__` drops the comma when the variable arguments are empty.
            if token.kind == SyntaxKind::Comma
                && self.dialect.gnu_extensions
                && body.get(i + 1).is_some_and(|next| next.kind == SyntaxKind::HashHash)
                && let Some(variadic) = mac.variadic_index()
                && body.get(i + 2).and_then(|next| self.param_of(mac, next)) == Some(variadic)
            {
                if !args[variadic].is_empty() {
                    pieces.push(Piece::Token(self.relocated(token.clone(), name, id)));
                    let leading_space = body[i + 2].leading_space;
                    for (k, arg) in args[variadic].iter().enumerate() {
                        let mut arg = arg.clone();
                        if k == 0 {
                            arg.leading_space = leading_space;
                        }
                        pieces.push(Piece::Token(arg));
                    }
                }
                i += 3;
                continue;
            }

            if let Some(param) = self.param_of(mac, token) {
                let pasted = (i > 0 && body[i - 1].kind == SyntaxKind::HashHash)
                    || body.get(i + 1).is_some_and(|next| next.kind == SyntaxKind::HashHash);
                let replacement = if pasted {
                    args[param].clone()
                } else if let Some(done) = &expanded[param] {
                    done.clone()
                } else {
                    let done = self.pre_expand(args[param].clone());
                    expanded[param] = Some(done.clone());
                    done
                };
                if replacement.is_empty() {
                    if pasted {
                        pieces.push(Piece::Placemarker);
                    }
                } else {
                    for (k, mut arg) in replacement.into_iter().enumerate() {
                        if k == 0 {
                            arg.leading_space = token.leading_space;
                        }
                        pieces.push(Piece::Token(arg));
                    }
                }
                i += 1;
                continue;
            }

            pieces.push(Piece::Token(self.relocated(token.clone(), name, id)));
            i += 1;
        }
        pieces
    }

    fn param_of(
        &self,
        mac: &Macro,
        token: &PpToken,
    ) -> Option<usize> {
        if token.kind != SyntaxKind::Ident {
            return None;
        }
        mac.param_index(&token.text)
    }

    /// Applies `##` and drops placemarkers.
    fn paste(
        &mut self,
        pieces: Vec<Piece>,
    ) -> Vec<PpToken> {
        let mut out: Vec<Piece> = Vec::with_capacity(pieces.len());
        let mut iter = pieces.into_iter();
        while let Some(piece) = iter.next() {
            let Piece::Paste = piece else {
                out.push(piece);
                continue;
            };
            match (out.pop(), iter.next()) {
                (Some(Piece::Token(lhs)), Some(Piece::Token(rhs))) => {
                    for token in self.paste_pair(lhs, rhs) {
                        out.push(Piece::Token(token));
                    }
                },
                (Some(Piece::Token(token)), _) | (_, Some(Piece::Token(token))) => out.push(Piece::Token(token)),
                (Some(Piece::Placemarker), _) | (_, Some(Piece::Placemarker)) => out.push(Piece::Placemarker),
                _ => {},
            }
        }
        out.into_iter()
            .filter_map(|piece| match piece {
                Piece::Token(token) => Some(token),
                _ => None,
            })
            .collect()
    }

    fn paste_pair(
        &mut self,
        lhs: PpToken,
        rhs: PpToken,
    ) -> Vec<PpToken> {
        let text = format!("{}{}", lhs.text, rhs.text);
        match lex_single(&text) {
            Some(kind) => vec![PpToken {
                kind,
                text: Arc::from(text),
                painted: false,
                ..lhs
            }],
            None => {
                self.error(
                    format!(
                        "pasting \"{}\" and \"{}\" does not give a valid preprocessing token",
                        lhs.text, rhs.text
                    ),
                    Some(lhs.location),
                );
                vec![lhs, rhs]
            },
        }
    }

    fn file_token(
        &self,
        name: &PpToken,
    ) -> PpToken {
        let path = self.sources.path(name.location.file);
        let escaped = path.replace('\\', "\\\\").replace('"', "\\\"");
        PpToken {
            kind: SyntaxKind::String,
            text: Arc::from(format!("\"{escaped}\"")),
            painted: false,
            ..name.clone()
        }
    }

    fn line_token(
        &self,
        name: &PpToken,
    ) -> PpToken {
        let line = self.sources.line_col(name.location).map_or(0, |pos| pos.line + 1);
        PpToken {
            kind: SyntaxKind::Integer,
            text: Arc::from(line.to_string()),
            painted: false,
            ..name.clone()
        }
    }

    /// `_Pragma("...")`: the string is destringized and handled like `#pragma`.
    fn pragma_operator(
        &mut self,
        keyword: &PpToken,
    ) {
        let mut consumed = Vec::new();
        for expected in [SyntaxKind::LParen, SyntaxKind::String, SyntaxKind::RParen] {
            match self.next_raw(false) {
                Some(token) if token.kind == expected => consumed.push(token),
                Some(token) => {
                    self.error("_Pragma takes a parenthesized string literal", Some(keyword.location));
                    self.push_back(vec![token]);
                    return;
                },
                None => {
                    self.error("_Pragma takes a parenthesized string literal", Some(keyword.location));
                    return;
                },
            }
        }
        let Some(text) = token::destringize(&consumed[1].text) else {
            return;
        };
        let tokens: Vec<PpToken> = token::lex_file(keyword.location.file, &text, &Default::default())
            .into_iter()
            .map(|mut token| {
                token.location = keyword.location;
                token
            })
            .collect();
        self.handle_pragma(&tokens, keyword.location);
    }
}

enum Invocation {
    NotCalled,
    Malformed,
    Called(Vec<Vec<PpToken>>),
}
