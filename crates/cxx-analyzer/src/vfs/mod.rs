use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rowan::{TextRange, TextSize};

use crate::text_pos::{LineCol, LineIndex};

/// Index of a file inside a [`SourceMap`]. The main file is always `FileId::MAIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    pub const MAIN: FileId = FileId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FileId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A span of original (un-normalized, un-expanded) source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileLocation {
    pub file: FileId,
    pub range: TextRange,
}

impl FileLocation {
    pub fn new(
        file: FileId,
        range: TextRange,
    ) -> Self {
        Self {
            file,
            range,
        }
    }

    pub fn offset(&self) -> usize {
        self.range.start().into()
    }

    pub fn len(&self) -> usize {
        self.range.len().into()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Smallest location covering both, or `self` when they live in different files.
    pub fn cover(
        self,
        other: FileLocation,
    ) -> FileLocation {
        if self.file != other.file {
            return self;
        }
        FileLocation::new(self.file, self.range.cover(other.range))
    }
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    path: Arc<str>,
    text: Arc<str>,
    lines: LineIndex,
}

impl SourceFile {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    pub fn line_col(
        &self,
        offset: TextSize,
    ) -> LineCol {
        self.lines.line_col(&self.text, offset)
    }
}

/// All files that took part in one translation unit.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new(
        main_path: &str,
        main_text: &str,
    ) -> Self {
        let mut map = Self::default();
        map.add(main_path, main_text);
        map
    }

    pub fn add(
        &mut self,
        path: &str,
        text: &str,
    ) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile {
            path: Arc::from(path),
            text: Arc::from(text),
            lines: LineIndex::new(text),
        });
        id
    }

    pub fn get(
        &self,
        file: FileId,
    ) -> Option<&SourceFile> {
        self.files.get(file.index())
    }

    pub fn main(&self) -> Option<&SourceFile> {
        self.get(FileId::MAIN)
    }

    pub fn path(
        &self,
        file: FileId,
    ) -> &str {
        self.get(file).map(SourceFile::path).unwrap_or("<unknown>")
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Original text covered by a location.
    pub fn slice(
        &self,
        location: FileLocation,
    ) -> Option<&str> {
        let file = self.get(location.file)?;
        file.text().get(std::ops::Range::<usize>::from(location.range))
    }

    pub fn line_col(
        &self,
        location: FileLocation,
    ) -> Option<LineCol> {
        Some(self.get(location.file)?.line_col(location.range.start()))
    }

    /// `path:line:col` with one-based line and column.
    pub fn describe(
        &self,
        location: FileLocation,
    ) -> String {
        match self.line_col(location) {
            Some(pos) => format!("{}:{}:{}", self.path(location.file), pos.line + 1, pos.col + 1),
            None => self.path(location.file).to_string(),
        }
    }
}

pub fn normalized_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
