use std::sync::Arc;

use crate::pp::condition;
use crate::pp::token::{PpToken, destringize, spell};
use crate::pp::{CondFrame, FileState, IncludeKind, IncludeRequest, Macro, Preprocessor};
use crate::syntax::kind::SyntaxKind;
use crate::vfs::FileLocation;

/// Pragmas that are understood and deliberately have no effect here.
const IGNORED_PRAGMAS: &[&str] = &[
    "GCC",
    "STDC",
    "pack",
    "message",
    "region",
    "endregion",
    "weak",
    "mark",
    "clang",
    "comment",
    "warning",
    "system_header",
    "redefine_extname",
];

impl<'r> Preprocessor<'r> {
    /// Removes `# ...` up to the end of the line from the current file.
    fn take_directive_line(&mut self) -> Option<(PpToken, Vec<PpToken>)> {
        let state = self.files.last_mut()?;
        let hash = state.tokens.get(state.pos)?.clone();
        state.pos += 1;
        let start = state.pos;
        while state.tokens.get(state.pos).is_some_and(|token| !token.at_line_start) {
            state.pos += 1;
        }
        Some((hash, state.tokens[start..state.pos].to_vec()))
    }

    pub(super) fn handle_directive(&mut self) {
        let Some((hash, line)) = self.take_directive_line() else {
            return;
        };
        let Some((first, rest)) = line.split_first() else {
            return;
        };
        let name = if first.kind == SyntaxKind::Ident { &*first.text } else { "" };
        tracing::trace!("directive #{}", first.text);

        match name {
            "define" => self.define(rest, first),
            "undef" => self.undef(rest, first),
            "include" | "include_next" | "import" => self.include(name, rest, first),
            "if" => {
                let value = self.eval_condition(rest, first);
                self.push_condition(value, hash.location);
            },
            "ifdef" | "ifndef" => {
                let Some(macro_name) = rest.first().filter(|token| token.kind == SyntaxKind::Ident) else {
                    self.error(format!("no macro name given in #{name} directive"), Some(first.location));
                    self.push_condition(false, hash.location);
                    return;
                };
                if rest.len() > 1 {
                    self.warning(format!("extra tokens at end of #{name} directive"), Some(rest[1].location));
                }
                let defined = self.macros.contains(&macro_name.text);
                self.push_condition(defined == (name == "ifdef"), hash.location);
            },
            "elif" | "else" => self.leave_taken_branch(name, first),
            "endif" => {
                let popped = self.files.last_mut().and_then(|state| state.conditions.pop());
                if popped.is_none() {
                    self.error("#endif without #if", Some(first.location));
                }
            },
            "error" => self.error(format!("#error {}", spell(rest)), Some(first.location)),
            "warning" => self.warning(format!("#warning {}", spell(rest)), Some(first.location)),
            "pragma" => self.handle_pragma(rest, first.location),
            "line" => self.line_directive(rest, first),
            "ident" | "sccs" | "assert" | "unassert" => {
                if self.dialect.strict_recovery {
                    self.error(format!("#{name} is an extension directive"), Some(first.location));
                }
            },
            _ if first.kind == SyntaxKind::Integer && self.dialect.gnu_extensions => {
                // GNU line marker: `# 12 "file.c" 1`
            },
            _ => self.error(format!("invalid preprocessing directive #{}", first.text), Some(first.location)),
        }
    }

    fn push_condition(
        &mut self,
        value: bool,
        location: FileLocation,
    ) {
        let Some(state) = self.files.last_mut() else {
            return;
        };
        state.conditions.push(CondFrame {
            taken: value,
            seen_else: false,
            location,
        });
        if !value {
            self.skip_inactive();
        }
    }

    /// `#elif`/`#else` reached from an active branch: the rest of the conditional is skipped.
    fn leave_taken_branch(
        &mut self,
        name: &str,
        directive: &PpToken,
    ) {
        let Some(frame) = self.files.last_mut().and_then(|state| state.conditions.last_mut()) else {
            self.error(format!("#{name} without #if"), Some(directive.location));
            return;
        };
        let after_else = frame.seen_else;
        if name == "else" {
            frame.seen_else = true;
        }
        if after_else {
            self.error(format!("#{name} after #else"), Some(directive.location));
        }
        self.skip_inactive();
    }

    /// Skips a false branch. Only directive nesting is tracked; nothing is
    /// expanded and lexical errors are not reported.
    fn skip_inactive(&mut self) {
        let mut depth = 0usize;
        loop {
            let Some(state) = self.files.last_mut() else {
                return;
            };
            let Some(token) = state.tokens.get(state.pos) else {
                return;
            };
            if !(token.at_line_start && token.kind == SyntaxKind::Hash) {
                state.pos += 1;
                continue;
            }
            let Some((_, line)) = self.take_directive_line() else {
                return;
            };
            let Some(first) = line.first().filter(|token| token.kind == SyntaxKind::Ident) else {
                continue;
            };
            match &*first.text {
                "if" | "ifdef" | "ifndef" => depth += 1,
                "endif" if depth > 0 => depth -= 1,
                "endif" => {
                    if let Some(state) = self.files.last_mut() {
                        state.conditions.pop();
                    }
                    return;
                },
                "elif" | "else" if depth == 0 => {
                    let Some(frame) = self.files.last().and_then(|state| state.conditions.last().copied()) else {
                        return;
                    };
                    let is_else = &*first.text == "else";
                    if frame.seen_else {
                        self.error(format!("#{} after #else", first.text), Some(first.location));
                    }
                    let activate = !frame.taken && (is_else || self.eval_condition(&line[1..], first));
                    if let Some(frame) = self.files.last_mut().and_then(|state| state.conditions.last_mut()) {
                        frame.seen_else |= is_else;
                        frame.taken |= activate;
                    }
                    if activate {
                        return;
                    }
                },
                _ => {},
            }
        }
    }

    /// Evaluates an `#if`/`#elif` condition; errors are reported and count as false.
    fn eval_condition(
        &mut self,
        tokens: &[PpToken],
        directive: &PpToken,
    ) -> bool {
        let result = self.replace_defined(tokens).and_then(|replaced| {
            let expanded = self.pre_expand(replaced);
            // `defined` produced by macro expansion.
            self.replace_defined(&expanded)
        });
        let outcome = result.and_then(|tokens| condition::evaluate(&tokens, self.dialect.is_cpp()));
        match outcome {
            Ok(value) => value,
            Err(message) => {
                self.error(message, Some(directive.location));
                false
            },
        }
    }

    fn replace_defined(
        &self,
        tokens: &[PpToken],
    ) -> Result<Vec<PpToken>, String> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            if !token.is_ident("defined") {
                out.push(token.clone());
                i += 1;
                continue;
            }
            let (name, consumed) = match tokens.get(i + 1) {
                Some(name) if name.kind == SyntaxKind::Ident => (name, 2),
                Some(open) if open.kind == SyntaxKind::LParen => match (tokens.get(i + 2), tokens.get(i + 3)) {
                    (Some(name), Some(close)) if name.kind == SyntaxKind::Ident && close.kind == SyntaxKind::RParen => {
                        (name, 4)
                    },
                    _ => return Err("missing ')' after \"defined\"".to_string()),
                },
                _ => return Err("operator \"defined\" requires an identifier".to_string()),
            };
            let value = if self.macros.contains(&name.text) { "1" } else { "0" };
            out.push(PpToken {
                kind: SyntaxKind::Integer,
                text: Arc::from(value),
                ..token.clone()
            });
            i += consumed;
        }
        Ok(out)
    }

    fn define(
        &mut self,
        rest: &[PpToken],
        directive: &PpToken,
    ) {
        let Some((name, after)) = rest.split_first() else {
            self.error("no macro name given in #define directive", Some(directive.location));
            return;
        };
        if name.kind != SyntaxKind::Ident {
            self.error("macro names must be identifiers", Some(name.location));
            return;
        }
        if &*name.text == "defined" {
            self.error("\"defined\" cannot be used as a macro name", Some(name.location));
            return;
        }

        let function_like = after.first().is_some_and(|token| token.kind == SyntaxKind::LParen && !token.leading_space);
        let (params, variadic, body_start) = if function_like {
            match parse_params(after) {
                Ok(parsed) => parsed,
                Err(message) => {
                    self.error(message, Some(name.location));
                    return;
                },
            }
        } else {
            (Vec::new(), false, 0)
        };

        let mut replacement = after[body_start..].to_vec();
        if let Some(first) = replacement.first_mut() {
            first.leading_space = false;
        }
        let hash_hash_at_edge = replacement.first().is_some_and(|token| token.kind == SyntaxKind::HashHash)
            || replacement.last().is_some_and(|token| token.kind == SyntaxKind::HashHash);
        if hash_hash_at_edge {
            self.error("'##' cannot appear at either end of a macro expansion", Some(name.location));
            return;
        }
        if function_like {
            for (i, token) in replacement.iter().enumerate() {
                let stringizes_param = replacement
                    .get(i + 1)
                    .is_some_and(|next| next.kind == SyntaxKind::Ident && params.iter().any(|p| *p == next.text));
                if token.kind == SyntaxKind::Hash && !stringizes_param {
                    self.error("'#' is not followed by a macro parameter", Some(token.location));
                    return;
                }
            }
        }
        if !variadic && replacement.iter().any(|token| token.is_ident("__VA_ARGS__")) {
            self.warning(
                "__VA_ARGS__ can only appear in the expansion of a variadic macro",
                Some(name.location),
            );
        }

        let mac = Macro {
            name: Arc::clone(&name.text),
            params: function_like.then_some(params),
            variadic,
            replacement,
            location: Some(name.location),
            builtin: None,
        };
        if let Some(existing) = self.macros.get(&name.text) {
            if existing.builtin.is_some() {
                self.error(format!("redefining builtin macro \"{}\"", name.text), Some(name.location));
                return;
            }
            if !existing.is_equivalent(&mac) {
                self.warning(format!("\"{}\" redefined", name.text), Some(name.location));
            }
        }
        tracing::trace!("#define {}", mac.definition());
        self.macros.insert(mac);
    }

    fn undef(
        &mut self,
        rest: &[PpToken],
        directive: &PpToken,
    ) {
        let Some(name) = rest.first().filter(|token| token.kind == SyntaxKind::Ident) else {
            self.error("no macro name given in #undef directive", Some(directive.location));
            return;
        };
        if rest.len() > 1 {
            self.warning("extra tokens at end of #undef directive", Some(rest[1].location));
        }
        if self.macros.get(&name.text).is_some_and(|mac| mac.builtin.is_some()) {
            self.error(format!("undefining builtin macro \"{}\"", name.text), Some(name.location));
            return;
        }
        self.macros.remove(&name.text);
    }

    fn include(
        &mut self,
        directive_name: &str,
        rest: &[PpToken],
        directive: &PpToken,
    ) {
        let header = match header_name(rest) {
            Some(header) => Some(header),
            None => {
                let expanded = self.pre_expand(rest.to_vec());
                header_name(&expanded)
            },
        };
        let Some((header, kind)) = header else {
            self.error(
                format!("#{directive_name} expects \"FILENAME\" or <FILENAME>"),
                Some(directive.location),
            );
            return;
        };
        if self.files.len() > self.limits.max_include_depth {
            self.error("#include nested too deeply", Some(directive.location));
            return;
        }

        let includer = self.current_path();
        let request = IncludeRequest {
            header: &header,
            kind,
            includer: &includer,
            include_next: directive_name == "include_next",
        };
        let Some(found) = self.resolver.resolve(&request) else {
            self.error(format!("'{header}' file not found"), Some(directive.location));
            return;
        };

        let path: Arc<str> = Arc::from(found.path.as_str());
        if self.once.contains(&path) || (directive_name == "import" && self.included.contains(&path)) {
            tracing::trace!("skipping already included {path}");
            return;
        }
        self.included.insert(Arc::clone(&path));
        tracing::debug!("entering {path}");
        let file = self.sources.add(&path, &found.content);
        let tokens = self.lex(file, &found.content);
        self.files.push(FileState {
            path,
            tokens,
            pos: 0,
            conditions: Vec::new(),
        });
    }

    pub(super) fn handle_pragma(
        &mut self,
        tokens: &[PpToken],
        location: FileLocation,
    ) {
        let Some(first) = tokens.first() else {
            return;
        };
        match &*first.text {
            "once" => {
                let path = self.current_path();
                self.once.insert(path);
            },
            "push_macro" | "pop_macro" => {
                let name = match tokens.get(1..4) {
                    Some([open, name, close])
                        if open.kind == SyntaxKind::LParen
                            && name.kind == SyntaxKind::String
                            && close.kind == SyntaxKind::RParen =>
                    {
                        destringize(&name.text)
                    },
                    _ => None,
                };
                let Some(name) = name else {
                    self.error(format!("invalid #pragma {} directive", first.text), Some(location));
                    return;
                };
                let name: Arc<str> = Arc::from(name);
                if &*first.text == "push_macro" {
                    let current = self.macros.get(&name).cloned();
                    self.pushed_macros.entry(name).or_default().push(current);
                } else if let Some(saved) = self.pushed_macros.get_mut(&name).and_then(Vec::pop) {
                    match saved {
                        Some(mac) => self.macros.insert_shared(mac),
                        None => {
                            self.macros.remove(&name);
                        },
                    }
                }
            },
            pragma if IGNORED_PRAGMAS.contains(&pragma) => {},
            pragma => {
                if self.dialect.strict_recovery {
                    self.error(format!("unknown pragma \"{pragma}\""), Some(location));
                } else {
                    tracing::trace!("ignoring #pragma {pragma}");
                }
            },
        }
    }

    fn line_directive(
        &mut self,
        rest: &[PpToken],
        directive: &PpToken,
    ) {
        let valid_number = rest
            .first()
            .is_some_and(|token| token.kind == SyntaxKind::Integer && token.text.bytes().all(|b| b.is_ascii_digit()));
        if !valid_number {
            self.error("#line directive requires a simple digit sequence", Some(directive.location));
            return;
        }
        if let Some(file) = rest.get(1)
            && file.kind != SyntaxKind::String
        {
            self.error(format!("invalid filename \"{}\" in #line directive", file.text), Some(file.location));
        }
    }
}

/// Parses `(a, b, ...)` after a macro name. Returns the parameters, the
/// variadic flag and the index of the first replacement token.
fn parse_params(tokens: &[PpToken]) -> Result<(Vec<Arc<str>>, bool, usize), String> {
    let mut params: Vec<Arc<str>> = Vec::new();
    let mut variadic = false;
    let mut i = 1;
    if tokens.get(i).is_some_and(|token| token.kind == SyntaxKind::RParen) {
        return Ok((params, false, i + 1));
    }
    loop {
        match tokens.get(i) {
            Some(token) if token.kind == SyntaxKind::Ellipsis => {
                params.push(Arc::from("__VA_ARGS__"));
                variadic = true;
                i += 1;
            },
            Some(token) if token.kind == SyntaxKind::Ident => {
                if &*token.text == "__VA_ARGS__" {
                    return Err("__VA_ARGS__ can not be used as a parameter name".to_string());
                }
                if params.contains(&token.text) {
                    return Err(format!("duplicate macro parameter \"{}\"", token.text));
                }
                params.push(Arc::clone(&token.text));
                i += 1;
                if tokens.get(i).is_some_and(|token| token.kind == SyntaxKind::Ellipsis) {
                    variadic = true;
                    i += 1;
                }
            },
            _ => return Err("expected parameter name in macro parameter list".to_string()),
        }
        match tokens.get(i) {
            Some(token) if token.kind == SyntaxKind::RParen => return Ok((params, variadic, i + 1)),
            Some(token) if token.kind == SyntaxKind::Comma && !variadic => i += 1,
            _ => return Err("expected ',' or ')' in macro parameter list".to_string()),
        }
    }
}

fn header_name(tokens: &[PpToken]) -> Option<(String, IncludeKind)> {
    let first = tokens.first()?;
    if first.kind == SyntaxKind::String && first.text.starts_with('"') && first.text.len() >= 2 {
        return Some((first.text[1..first.text.len() - 1].to_string(), IncludeKind::Quoted));
    }
    if first.kind != SyntaxKind::Less {
        return None;
    }
    let close = tokens.iter().position(|token| token.kind == SyntaxKind::Greater)?;
    let inner = &tokens[1..close];
    let mut name = String::new();
    for (i, token) in inner.iter().enumerate() {
        if i > 0 && token.leading_space {
            name.push(' ');
        }
        name.push_str(&token.text);
    }
    Some((name, IncludeKind::Angled))
}
