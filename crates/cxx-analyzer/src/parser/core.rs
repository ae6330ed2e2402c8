use crate::config::{DialectConfig, ParseLimits};
use crate::diagnostics::ErrorKind;
use crate::parser::event::Event;
use crate::parser::input::Input;
use crate::parser::oracle::{Oracle, OracleMark};
use crate::syntax::kind::SyntaxKind;

/// Nesting of expressions, statements and declarators beyond which parsing gives up.
const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParseError {
    pub(crate) kind: ErrorKind,
    pub(crate) message: String,
    /// Input token index the error was detected at.
    pub(crate) pos: usize,
}

pub(crate) type PResult<T = ()> = Result<T, ParseError>;

/// Everything a speculative attempt can change, captured in O(1).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    pos: usize,
    events: usize,
    undo: usize,
    errors: usize,
    oracle: OracleMark,
    flags: Flags,
}

/// Context switches that nest with the grammar.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Flags {
    /// `>` closes a template argument list instead of comparing.
    pub(crate) no_greater: bool,
    /// The declaration being parsed is the body of a template declaration.
    pub(crate) in_template: bool,
}

pub(crate) struct Parser<'i> {
    input: &'i Input,
    pos: usize,
    events: Vec<Event>,
    /// Overwritten events, so that rollback can restore them.
    undo: Vec<(usize, Event)>,
    open_checkpoints: usize,
    depth: usize,
    pub(crate) dialect: DialectConfig,
    pub(crate) limits: ParseLimits,
    pub(crate) oracle: Oracle,
    pub(crate) flags: Flags,
    /// Names of the classes whose bodies are being parsed, innermost last.
    pub(crate) classes: Vec<std::sync::Arc<str>>,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) recoveries: usize,
}

impl<'i> Parser<'i> {
    pub(crate) fn new(
        input: &'i Input,
        dialect: &DialectConfig,
        limits: &ParseLimits,
    ) -> Self {
        Self {
            input,
            pos: 0,
            events: Vec::new(),
            undo: Vec::new(),
            open_checkpoints: 0,
            depth: 0,
            dialect: *dialect,
            limits: *limits,
            oracle: Oracle::new(),
            flags: Flags::default(),
            classes: Vec::new(),
            errors: Vec::new(),
            recoveries: 0,
        }
    }

    pub(crate) fn finish(self) -> (Vec<Event>, Vec<ParseError>) {
        (self.events, self.errors)
    }

    pub(crate) fn is_cpp(&self) -> bool {
        self.dialect.is_cpp()
    }

    pub(crate) fn gnu(&self) -> bool {
        self.dialect.gnu_extensions
    }

    /// Strict mode gives up at the first recorded error; so does an exhausted recovery budget.
    pub(crate) fn stopped(&self) -> bool {
        (self.dialect.strict_recovery && !self.errors.is_empty()) || self.recoveries > self.limits.max_recoveries
    }

    // Token access

    pub(crate) fn current(&self) -> SyntaxKind {
        self.input.kind(self.pos)
    }

    pub(crate) fn nth(
        &self,
        n: usize,
    ) -> SyntaxKind {
        self.input.kind(self.pos + n)
    }

    pub(crate) fn at(
        &self,
        kind: SyntaxKind,
    ) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn current_text(&self) -> &'i str {
        self.input.text(self.pos)
    }

    /// Current token is an identifier spelled `text` (contextual keywords).
    pub(crate) fn at_contextual(
        &self,
        text: &str,
    ) -> bool {
        self.at(SyntaxKind::Ident) && self.current_text() == text
    }

    pub(crate) fn at_name(&self) -> bool {
        self.current().is_name_token()
    }

    /// `>>` or `>>=` split into two tokens at the cursor.
    pub(crate) fn at_split_shift(&self) -> Option<SyntaxKind> {
        if !self.at(SyntaxKind::Greater) || !self.input.is_joint(self.pos) {
            return None;
        }
        match self.nth(1) {
            SyntaxKind::Greater => Some(SyntaxKind::RightShift),
            SyntaxKind::GreaterEqual => Some(SyntaxKind::RightShiftEqual),
            _ => None,
        }
    }

    /// The completion token has been consumed and only the end of input remains.
    pub(crate) fn past_completion(&self) -> bool {
        self.at_eof() && self.input.completion().is_some_and(|index| index < self.pos)
    }

    // Events

    pub(crate) fn bump(&mut self) {
        if self.at_eof() {
            return;
        }
        let kind = self.current();
        self.bump_as(kind, 1);
    }

    pub(crate) fn bump_as(
        &mut self,
        kind: SyntaxKind,
        n_raw: u8,
    ) {
        self.events.push(Event::Token {
            kind,
            n_raw,
        });
        self.pos += usize::from(n_raw);
    }

    pub(crate) fn eat(
        &mut self,
        kind: SyntaxKind,
    ) -> bool {
        if !self.at(kind) {
            return false;
        }
        self.bump();
        true
    }

    /// Consumes `kind` or fails. Missing tokens after the completion point are
    /// accepted so that a truncated input still yields its enclosing nodes.
    pub(crate) fn expect(
        &mut self,
        kind: SyntaxKind,
    ) -> PResult {
        if self.eat(kind) || self.past_completion() {
            return Ok(());
        }
        Err(self.error(format!("expected {}, found {}", describe(kind), self.describe_current())))
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::Start {
            kind: SyntaxKind::Error,
            forward_parent: None,
        });
        Marker {
            pos,
        }
    }

    fn set_event(
        &mut self,
        index: usize,
        event: Event,
    ) {
        if self.open_checkpoints > 0 {
            self.undo.push((index, self.events[index]));
        }
        self.events[index] = event;
    }

    // Errors

    pub(crate) fn error(
        &self,
        message: impl Into<String>,
    ) -> ParseError {
        ParseError {
            kind: ErrorKind::Syntax,
            message: message.into(),
            pos: self.pos,
        }
    }

    pub(crate) fn describe_current(&self) -> String {
        if self.at_eof() {
            "end of input".to_string()
        } else {
            format!("'{}'", self.current_text())
        }
    }

    /// Guards grammar recursion against pathological nesting.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // Speculation

    pub(crate) fn checkpoint(&mut self) -> Checkpoint {
        self.open_checkpoints += 1;
        Checkpoint {
            pos: self.pos,
            events: self.events.len(),
            undo: self.undo.len(),
            errors: self.errors.len(),
            oracle: self.oracle.mark(),
            flags: self.flags,
        }
    }

    pub(crate) fn release(
        &mut self,
        _checkpoint: Checkpoint,
    ) {
        self.close_checkpoint();
    }

    pub(crate) fn rollback(
        &mut self,
        checkpoint: Checkpoint,
    ) {
        while self.undo.len() > checkpoint.undo {
            if let Some((index, event)) = self.undo.pop()
                && index < checkpoint.events
            {
                self.events[index] = event;
            }
        }
        self.events.truncate(checkpoint.events);
        self.errors.truncate(checkpoint.errors);
        self.oracle.rollback(checkpoint.oracle);
        self.flags = checkpoint.flags;
        self.pos = checkpoint.pos;
        self.close_checkpoint();
    }

    fn close_checkpoint(&mut self) {
        self.open_checkpoints -= 1;
        if self.open_checkpoints == 0 {
            self.undo.clear();
        }
    }

    /// Runs `f`; on failure everything it did is undone.
    pub(crate) fn speculate<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        let checkpoint = self.checkpoint();
        match f(self) {
            Ok(value) => {
                self.release(checkpoint);
                Ok(value)
            },
            Err(error) => {
                self.rollback(checkpoint);
                Err(error)
            },
        }
    }

    /// Runs `f` and always undoes it; used as unbounded lookahead.
    pub(crate) fn lookahead<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let checkpoint = self.checkpoint();
        let value = f(self);
        self.rollback(checkpoint);
        value
    }

    /// Records a diagnostic for a construct replaced by a problem node.
    pub(crate) fn record(
        &mut self,
        error: ParseError,
    ) {
        tracing::trace!(pos = error.pos, "{}", error.message);
        self.errors.push(error);
    }
}

pub(crate) struct Marker {
    pos: u32,
}

impl Marker {
    pub(crate) fn complete(
        self,
        p: &mut Parser<'_>,
        kind: SyntaxKind,
    ) -> CompletedMarker {
        let index = self.pos as usize;
        p.set_event(
            index,
            Event::Start {
                kind,
                forward_parent: None,
            },
        );
        p.events.push(Event::Finish);
        CompletedMarker {
            pos: self.pos,
            kind,
        }
    }

    pub(crate) fn abandon(
        self,
        p: &mut Parser<'_>,
    ) {
        let index = self.pos as usize;
        if index + 1 == p.events.len() && p.open_checkpoints == 0 {
            p.events.pop();
        } else {
            p.set_event(index, Event::Tombstone);
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CompletedMarker {
    pos: u32,
    kind: SyntaxKind,
}

impl CompletedMarker {
    /// Starts a node that will wrap this one.
    pub(crate) fn precede(
        self,
        p: &mut Parser<'_>,
    ) -> Marker {
        let parent = p.start();
        p.set_event(
            self.pos as usize,
            Event::Start {
                kind: self.kind,
                forward_parent: Some(parent.pos - self.pos),
            },
        );
        parent
    }
}

/// Human readable token name for "expected ..." messages.
pub(crate) fn describe(kind: SyntaxKind) -> &'static str {
    match kind {
        SyntaxKind::Semicolon => "';'",
        SyntaxKind::Colon => "':'",
        SyntaxKind::Comma => "','",
        SyntaxKind::LParen => "'('",
        SyntaxKind::RParen => "')'",
        SyntaxKind::LBrace => "'{'",
        SyntaxKind::RBrace => "'}'",
        SyntaxKind::LBracket => "'['",
        SyntaxKind::RBracket => "']'",
        SyntaxKind::Less => "'<'",
        SyntaxKind::Greater => "'>'",
        SyntaxKind::Equal => "'='",
        SyntaxKind::DoubleColon => "'::'",
        SyntaxKind::Star => "'*'",
        SyntaxKind::String => "string literal",
        SyntaxKind::Ident => "identifier",
        SyntaxKind::KwWhile => "'while'",
        SyntaxKind::KwCatch => "'catch'",
        _ => "token",
    }
}
