//! Trigraph and digraph normalization.
//!
//! Trigraphs are replaced everywhere, including inside literals and comments.
//! Digraphs are only replaced where they would be punctuators, so string and
//! character literals and comments are left alone.

use rowan::{TextRange, TextSize};

/// Normalized text plus the mapping back to the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub offsets: OffsetMap,
}

impl Normalized {
    /// The text unchanged, with an identity offset map.
    pub fn identity(text: &str) -> Self {
        Self {
            text: text.to_string(),
            offsets: OffsetMap::default(),
        }
    }
}

/// One replaced sequence: `original` in the input became `normalized` in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edit {
    normalized: TextRange,
    original: TextRange,
}

/// Maps normalized offsets back to original offsets.
///
/// A position inside a replacement maps to the whole original sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetMap {
    edits: Vec<Edit>,
}

impl OffsetMap {
    pub fn is_identity(&self) -> bool {
        self.edits.is_empty()
    }

    /// Original offset of the character at normalized `offset`.
    pub fn to_original(
        &self,
        offset: TextSize,
    ) -> TextSize {
        let idx = self.edits.partition_point(|edit| edit.normalized.start() <= offset);
        let Some(edit) = idx.checked_sub(1).map(|i| self.edits[i]) else {
            return offset;
        };
        if offset < edit.normalized.end() {
            return edit.original.start();
        }
        edit.original.end() + (offset - edit.normalized.end())
    }

    /// Original offset corresponding to an exclusive normalized end offset.
    fn to_original_end(
        &self,
        offset: TextSize,
    ) -> TextSize {
        let idx = self.edits.partition_point(|edit| edit.normalized.start() < offset);
        let Some(edit) = idx.checked_sub(1).map(|i| self.edits[i]) else {
            return offset;
        };
        if offset <= edit.normalized.end() {
            return edit.original.end();
        }
        edit.original.end() + (offset - edit.normalized.end())
    }

    pub fn range_to_original(
        &self,
        range: TextRange,
    ) -> TextRange {
        let start = self.to_original(range.start());
        if range.is_empty() {
            return TextRange::empty(start);
        }
        TextRange::new(start, self.to_original_end(range.end()))
    }
}

fn trigraph_replacement(third: u8) -> Option<char> {
    let replacement = match third {
        b'=' => '#',
        b'(' => '[',
        b')' => ']',
        b'<' => '{',
        b'>' => '}',
        b'/' => '\\',
        b'\'' => '^',
        b'!' => '|',
        b'-' => '~',
        _ => return None,
    };
    Some(replacement)
}

fn digraph_at(rest: &[u8]) -> Option<(&'static str, usize)> {
    if rest.starts_with(b"%:%:") {
        return Some(("##", 4));
    }
    let replacement = match rest.get(..2)? {
        b"<:" => "[",
        b":>" => "]",
        b"<%" => "{",
        b"%>" => "}",
        b"%:" => "#",
        _ => return None,
    };
    Some((replacement, 2))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    String,
    Char,
    LineComment,
    BlockComment,
}

/// Replaces trigraphs and digraphs. `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> Normalized {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut edits = Vec::new();
    let mut state = State::Code;
    let mut escaped = false;
    let mut i = 0;

    while i < bytes.len() {
        // Character at `i` after trigraph replacement, and how many input bytes it spans.
        let (ch, width, replaced) = if bytes[i] == b'?'
            && bytes.get(i + 1) == Some(&b'?')
            && let Some(ch) = bytes.get(i + 2).copied().and_then(trigraph_replacement)
        {
            (ch, 3, true)
        } else {
            let Some(ch) = text[i..].chars().next() else {
                break;
            };
            (ch, ch.len_utf8(), false)
        };

        if state == State::Code
            && !replaced
            && let Some((replacement, len)) = digraph_at(&bytes[i..])
        {
            push_edit(&mut edits, &mut out, replacement, i, len);
            i += len;
            continue;
        }

        if replaced {
            let mut buf = [0u8; 4];
            push_edit(&mut edits, &mut out, ch.encode_utf8(&mut buf), i, width);
        } else {
            out.push(ch);
        }

        state = match state {
            State::Code => match ch {
                '"' => State::String,
                '\'' => State::Char,
                '/' if bytes.get(i + width) == Some(&b'/') => State::LineComment,
                '/' if bytes.get(i + width) == Some(&b'*') => {
                    out.push('*');
                    i += 1;
                    State::BlockComment
                },
                _ => State::Code,
            },
            State::String | State::Char => {
                let quote = if state == State::String { '"' } else { '\'' };
                if escaped {
                    escaped = false;
                    state
                } else if ch == '\\' {
                    escaped = true;
                    state
                } else if ch == quote || ch == '\n' {
                    State::Code
                } else {
                    state
                }
            },
            State::LineComment => {
                if ch == '\n' {
                    State::Code
                } else {
                    State::LineComment
                }
            },
            State::BlockComment => {
                if ch == '*' && bytes.get(i + width) == Some(&b'/') {
                    out.push('/');
                    i += 1;
                    State::Code
                } else {
                    State::BlockComment
                }
            },
        };
        i += width;
    }

    Normalized {
        text: out,
        offsets: OffsetMap {
            edits,
        },
    }
}

fn push_edit(
    edits: &mut Vec<Edit>,
    out: &mut String,
    replacement: &str,
    original_start: usize,
    original_len: usize,
) {
    let normalized_start = TextSize::of(out.as_str());
    out.push_str(replacement);
    edits.push(Edit {
        normalized: TextRange::at(normalized_start, TextSize::of(replacement)),
        original: TextRange::at(
            TextSize::from(original_start as u32),
            TextSize::from(original_len as u32),
        ),
    });
}

#[cfg(test)]
#[path = "../../tests/src/pp/trigraph_tests.rs"]
mod tests;
