use std::mem;

use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

use crate::parser::input::Input;
use crate::pp::ExpansionId;
use crate::syntax::kind::SyntaxKind;
use crate::vfs::FileLocation;

/// Parser output, replayed into a green tree once parsing is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    /// `forward_parent` links to a node started later that wraps this one
    /// (see `CompletedMarker::precede`).
    Start {
        kind: SyntaxKind,
        forward_parent: Option<u32>,
    },
    Finish,
    /// One tree token made of `n_raw` input tokens (`>` `>` glued back to `>>`).
    Token {
        kind: SyntaxKind,
        n_raw: u8,
    },
    Tombstone,
}

/// Maps a token of the tree back to the source it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLocation {
    pub range: TextRange,
    pub location: FileLocation,
    pub expansion: Option<ExpansionId>,
}

/// Builds the green tree; whitespace between tokens is synthesized from the
/// token spacing flags so that every node's range starts at its first token.
/// An empty problem node is placed before the input token at each of the
/// ascending `problems` positions.
pub(crate) fn build_tree(
    input: &Input,
    mut events: Vec<Event>,
    problems: &[usize],
) -> (GreenNode, Vec<TokenLocation>) {
    let mut sink = TreeSink {
        input,
        pos: 0,
        offset: TextSize::from(0),
        builder: GreenNodeBuilder::new(),
        locations: Vec::with_capacity(input.len()),
        trivia_done: false,
        problems,
        open: Vec::new(),
    };
    let mut parents = Vec::new();

    for i in 0..events.len() {
        match mem::replace(&mut events[i], Event::Tombstone) {
            Event::Start {
                kind,
                forward_parent,
            } => {
                parents.push(kind);
                let mut index = i;
                let mut next = forward_parent;
                while let Some(distance) = next {
                    index += distance as usize;
                    next = match mem::replace(&mut events[index], Event::Tombstone) {
                        Event::Start {
                            kind,
                            forward_parent,
                        } => {
                            parents.push(kind);
                            forward_parent
                        },
                        _ => None,
                    };
                }
                for kind in parents.drain(..).rev() {
                    sink.start(kind);
                }
            },
            Event::Finish => sink.finish(),
            Event::Token {
                kind,
                n_raw,
            } => sink.token(kind, n_raw),
            Event::Tombstone => {},
        }
    }

    (sink.builder.finish(), sink.locations)
}

struct TreeSink<'i> {
    input: &'i Input,
    pos: usize,
    offset: TextSize,
    builder: GreenNodeBuilder<'static>,
    locations: Vec<TokenLocation>,
    trivia_done: bool,
    problems: &'i [usize],
    open: Vec<SyntaxKind>,
}

impl TreeSink<'_> {
    fn start(
        &mut self,
        kind: SyntaxKind,
    ) {
        self.flush_problems(self.pos);
        self.flush_trivia();
        self.builder.start_node(kind.into());
        self.open.push(kind);
    }

    fn finish(&mut self) {
        if self.open.len() == 1 {
            self.flush_problems(usize::MAX);
        }
        self.builder.finish_node();
        self.open.pop();
    }

    /// Emits the problem nodes due at or before input position `pos` into
    /// the innermost open node.
    fn flush_problems(
        &mut self,
        pos: usize,
    ) {
        let Some(&parent) = self.open.last() else {
            return;
        };
        let kind = if parent == SyntaxKind::CompoundStatement {
            SyntaxKind::ProblemStatement
        } else {
            SyntaxKind::ProblemDeclaration
        };
        while let Some((&site, rest)) = self.problems.split_first()
            && site <= pos
        {
            self.builder.start_node(kind.into());
            self.builder.finish_node();
            self.problems = rest;
        }
    }

    fn token(
        &mut self,
        kind: SyntaxKind,
        n_raw: u8,
    ) {
        self.flush_problems(self.pos);
        self.flush_trivia();
        let Some(first) = self.input.token(self.pos) else {
            return;
        };
        let location = first.location;
        let expansion = first.expansion;
        let mut text = String::new();
        for k in 0..usize::from(n_raw.max(1)) {
            text.push_str(self.input.text(self.pos + k));
        }
        let len = TextSize::of(text.as_str());
        self.builder.token(kind.into(), &text);
        self.locations.push(TokenLocation {
            range: TextRange::at(self.offset, len),
            location,
            expansion,
        });
        self.offset += len;
        self.pos += usize::from(n_raw.max(1));
        self.trivia_done = false;
    }

    fn flush_trivia(&mut self) {
        if self.trivia_done || self.pos == 0 {
            return;
        }
        self.trivia_done = true;
        let Some(token) = self.input.token(self.pos) else {
            return;
        };
        let (kind, text) = if token.at_line_start {
            (SyntaxKind::Newline, "\n")
        } else if token.leading_space {
            (SyntaxKind::Whitespace, " ")
        } else {
            return;
        };
        self.builder.token(kind.into(), text);
        self.offset += TextSize::of(text);
    }
}
