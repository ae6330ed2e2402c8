use rowan::TextSize;

/// Zero-based line and character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// Byte offsets of every line start in a text.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![TextSize::from(0)];
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                starts.push(TextSize::from((idx + 1) as u32));
            }
        }
        Self {
            starts,
        }
    }

    pub fn line_col(
        &self,
        text: &str,
        offset: TextSize,
    ) -> LineCol {
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let start: usize = self.starts[line].into();
        let end = usize::from(offset).min(text.len());
        let col = text.get(start..end).map(|s| s.chars().count()).unwrap_or(0);
        LineCol {
            line: line as u32,
            col: col as u32,
        }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// Byte offset for a zero-based line and character column.
pub fn byte_offset_from_line_col(
    source: &str,
    position: LineCol,
) -> Option<usize> {
    let mut lines = source.split('\n');
    let mut byte_offset = 0usize;

    for _ in 0..position.line {
        let line = lines.next()?;
        byte_offset += line.len() + 1;
    }

    let line = lines.next()?;
    let char_offset: usize = line.chars().take(position.col as usize).map(char::len_utf8).sum();
    Some(byte_offset + char_offset)
}

pub fn line_col_from_byte_offset(
    source: &str,
    byte_offset: usize,
) -> LineCol {
    let clamped = byte_offset.min(source.len());
    let before = source.get(..clamped).unwrap_or(source);
    let line = before.bytes().filter(|&b| b == b'\n').count() as u32;
    let col = before.rsplit_once('\n').map(|(_, tail)| tail.chars().count()).unwrap_or_else(|| before.chars().count());
    LineCol {
        line,
        col: col as u32,
    }
}

#[cfg(test)]
#[path = "../tests/src/text_pos_tests.rs"]
mod tests;
