//! Preprocessor and macro expander.
//!
//! Expansion is driven by an explicit stack of replacement contexts. A macro
//! is active while its context is on the stack, and an identifier naming an
//! active macro is painted and never expanded again. The only recursion is
//! the pre-expansion of macro arguments, which is bounded by how deeply macro
//! invocations are nested inside arguments in the source.

mod condition;
mod directive;
mod expand;
pub mod include;
pub mod macros;
pub mod token;
pub mod trigraph;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub use include::{FileSystemIncludes, InMemoryIncludes, IncludeKind, IncludeRequest, IncludeResolver, IncludedFile, NoIncludes};
pub use macros::{Builtin, Macro, MacroTable};
pub use token::{Expansion, ExpansionId, ExpansionTable, PpToken, spell};
pub use trigraph::{Normalized, OffsetMap, normalize};

use rowan::{TextRange, TextSize};

use crate::config::{DialectConfig, ParseLimits};
use crate::diagnostics::{Diagnostic, ErrorKind};
use crate::syntax::kind::SyntaxKind;
use crate::vfs::{FileId, FileLocation, SourceMap};

/// Output of preprocessing one translation unit.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub tokens: Vec<PpToken>,
    pub diagnostics: Vec<Diagnostic>,
    /// Index into `tokens` at which each preprocessor error was raised.
    pub problems: Vec<usize>,
    pub expansions: ExpansionTable,
    pub sources: SourceMap,
    /// Macro table at the end of the main file.
    pub macros: MacroTable,
}

impl Preprocessed {
    /// The expanded token stream as text, breaking lines where source lines began.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                if token.at_line_start {
                    out.push('\n');
                } else if token.leading_space {
                    out.push(' ');
                }
            }
            out.push_str(&token.text);
        }
        out
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Convenience: preprocess `text` as the main file without includes.
pub fn preprocess(
    text: &str,
    dialect: &DialectConfig,
) -> Preprocessed {
    Preprocessor::new("<main>", text, dialect, &NoIncludes).run()
}

/// One replacement list being rescanned.
#[derive(Debug)]
struct Context {
    tokens: Vec<PpToken>,
    pos: usize,
    /// The macro whose replacement this is; `None` for pushed-back tokens.
    macro_name: Option<Arc<str>>,
    /// Argument pre-expansion stops here instead of reading past it.
    barrier: bool,
}

#[derive(Debug, Clone, Copy)]
struct CondFrame {
    /// Some branch of this conditional has been taken.
    taken: bool,
    seen_else: bool,
    location: FileLocation,
}

#[derive(Debug)]
struct FileState {
    path: Arc<str>,
    tokens: Vec<PpToken>,
    pos: usize,
    conditions: Vec<CondFrame>,
}

/// Preprocesses one translation unit.
pub struct Preprocessor<'r> {
    dialect: DialectConfig,
    limits: ParseLimits,
    resolver: &'r dyn IncludeResolver,
    macros: MacroTable,
    sources: SourceMap,
    files: Vec<FileState>,
    contexts: Vec<Context>,
    expansions: ExpansionTable,
    diagnostics: Vec<Diagnostic>,
    problems: Vec<usize>,
    /// Tokens handed out by `run` so far.
    emitted: usize,
    once: HashSet<Arc<str>>,
    included: HashSet<Arc<str>>,
    pushed_macros: HashMap<Arc<str>, Vec<Option<Arc<Macro>>>>,
    expanded_tokens: usize,
    budget_exhausted: bool,
    completion_offset: Option<usize>,
    main_text: String,
    started: bool,
}

impl<'r> Preprocessor<'r> {
    pub fn new(
        path: &str,
        text: &str,
        dialect: &DialectConfig,
        resolver: &'r dyn IncludeResolver,
    ) -> Self {
        Self {
            dialect: *dialect,
            limits: ParseLimits::default(),
            resolver,
            macros: MacroTable::predefined(dialect),
            sources: SourceMap::new(path, text),
            files: Vec::new(),
            contexts: Vec::new(),
            expansions: ExpansionTable::default(),
            diagnostics: Vec::new(),
            problems: Vec::new(),
            emitted: 0,
            once: HashSet::new(),
            included: HashSet::new(),
            pushed_macros: HashMap::new(),
            expanded_tokens: 0,
            budget_exhausted: false,
            completion_offset: None,
            main_text: text.to_string(),
            started: false,
        }
    }

    /// Adds `macros` on top of the predefined ones.
    pub fn with_macros(
        mut self,
        macros: &MacroTable,
    ) -> Self {
        self.macros.extend(macros);
        self
    }

    pub fn with_limits(
        mut self,
        limits: ParseLimits,
    ) -> Self {
        self.limits = limits;
        self
    }

    /// Stops the main file at `offset` and marks the identifier prefix there
    /// as a completion token.
    pub fn with_completion(
        mut self,
        offset: usize,
    ) -> Self {
        self.completion_offset = Some(offset);
        self
    }

    pub fn run(mut self) -> Preprocessed {
        let _span = tracing::debug_span!("preprocess", path = %self.sources.path(FileId::MAIN)).entered();
        self.enter_main_file();

        let mut tokens = Vec::new();
        while let Some(token) = self.next_expanded() {
            tokens.push(token);
            self.emitted = tokens.len();
        }

        tracing::debug!(
            tokens = tokens.len(),
            expansions = self.expansions.len(),
            diagnostics = self.diagnostics.len(),
            "preprocessed translation unit"
        );

        Preprocessed {
            tokens,
            diagnostics: self.diagnostics,
            problems: self.problems,
            expansions: self.expansions,
            sources: self.sources,
            macros: self.macros,
        }
    }

    fn enter_main_file(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let mut text = std::mem::take(&mut self.main_text);
        if let Some(offset) = self.completion_offset {
            let mut end = offset.min(text.len());
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
        }

        let mut tokens = self.lex(FileId::MAIN, &text);
        if let Some(offset) = self.completion_offset {
            mark_completion(&mut tokens, offset.min(text.len()));
        }
        let path: Arc<str> = Arc::from(self.sources.path(FileId::MAIN));
        self.files.push(FileState {
            path,
            tokens,
            pos: 0,
            conditions: Vec::new(),
        });
    }

    fn lex(
        &self,
        file: FileId,
        text: &str,
    ) -> Vec<PpToken> {
        if self.dialect.digraphs_trigraphs {
            let normalized = trigraph::normalize(text);
            token::lex_file(file, &normalized.text, &normalized.offsets)
        } else {
            token::lex_file(file, text, &OffsetMap::default())
        }
    }

    fn error(
        &mut self,
        message: impl Into<String>,
        location: Option<FileLocation>,
    ) {
        let diagnostic = Diagnostic::error(ErrorKind::Preprocessor, message, location);
        tracing::debug!("{diagnostic}");
        self.diagnostics.push(diagnostic);
        self.problems.push(self.emitted);
    }

    fn warning(
        &mut self,
        message: impl Into<String>,
        location: Option<FileLocation>,
    ) {
        self.diagnostics.push(Diagnostic::warning(ErrorKind::Preprocessor, message, location));
    }

    /// Next token of the current file, with directives processed.
    fn next_file_token(&mut self) -> Option<PpToken> {
        loop {
            let state = self.files.last_mut()?;
            let token = state.tokens.get(state.pos)?.clone();
            if token.at_line_start && token.kind == SyntaxKind::Hash {
                self.handle_directive();
                continue;
            }
            state.pos += 1;
            if token.kind == SyntaxKind::Error {
                let message = token::lex_error_message(&token.text);
                self.diagnostics.push(Diagnostic::error(ErrorKind::Lex, message, Some(token.location)));
                continue;
            }
            return Some(token);
        }
    }

    /// Pops the finished innermost include. Returns `false` once the main file is done.
    fn leave_file(&mut self) -> bool {
        let Some(state) = self.files.pop() else {
            return false;
        };
        for frame in &state.conditions {
            self.error("unterminated conditional directive", Some(frame.location));
        }
        if self.files.is_empty() {
            return false;
        }
        tracing::trace!("leaving {}", state.path);
        true
    }

    /// Next unexpanded token from the context stack or the files.
    ///
    /// Returns `None` at an exhausted barrier, or at the end of the current
    /// file when `cross_files` is false.
    fn next_raw(
        &mut self,
        cross_files: bool,
    ) -> Option<PpToken> {
        loop {
            if let Some(top) = self.contexts.last_mut() {
                if let Some(token) = top.tokens.get(top.pos).cloned() {
                    top.pos += 1;
                    return Some(token);
                }
                if top.barrier {
                    return None;
                }
                self.contexts.pop();
                continue;
            }
            if let Some(token) = self.next_file_token() {
                return Some(token);
            }
            if !cross_files || !self.leave_file() {
                return None;
            }
        }
    }

    fn push_back(
        &mut self,
        tokens: Vec<PpToken>,
    ) {
        if tokens.is_empty() {
            return;
        }
        self.contexts.push(Context {
            tokens,
            pos: 0,
            macro_name: None,
            barrier: false,
        });
    }

    fn is_active(
        &self,
        name: &str,
    ) -> bool {
        self.contexts.iter().any(|context| context.macro_name.as_deref() == Some(name))
    }

    fn current_path(&self) -> Arc<str> {
        self.files.last().map(|state| Arc::clone(&state.path)).unwrap_or_else(|| Arc::from(""))
    }
}

/// Marks the identifier ending at `offset` as the completion token, or
/// appends an empty completion token there.
fn mark_completion(
    tokens: &mut Vec<PpToken>,
    offset: usize,
) {
    if let Some(last) = tokens.last_mut()
        && last.kind == SyntaxKind::Ident
        && last.location.file == FileId::MAIN
        && usize::from(last.location.range.end()) == offset
    {
        last.kind = SyntaxKind::CompletionName;
        return;
    }
    let location = FileLocation::new(FileId::MAIN, TextRange::empty(TextSize::from(offset as u32)));
    let mut token = PpToken::new(SyntaxKind::CompletionName, "", location);
    token.leading_space = true;
    tokens.push(token);
}

#[cfg(test)]
#[path = "../../tests/src/pp/preprocessor_tests.rs"]
mod tests;
