//! Header resolution.
//!
//! The preprocessor never touches the file system itself; every `#include`
//! goes through an [`IncludeResolver`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeKind {
    /// `#include "header"`
    Quoted,
    /// `#include <header>`
    Angled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncludeRequest<'a> {
    pub header: &'a str,
    pub kind: IncludeKind,
    /// Path of the file containing the directive.
    pub includer: &'a str,
    pub include_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedFile {
    pub path: String,
    pub content: String,
}

pub trait IncludeResolver {
    fn resolve(
        &self,
        request: &IncludeRequest<'_>,
    ) -> Option<IncludedFile>;
}

/// Resolves nothing; every include is reported as not found.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIncludes;

impl IncludeResolver for NoIncludes {
    fn resolve(
        &self,
        _request: &IncludeRequest<'_>,
    ) -> Option<IncludedFile> {
        None
    }
}

/// Headers held in memory, keyed by the spelling used in the directive.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIncludes {
    files: HashMap<String, String>,
}

impl InMemoryIncludes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(
        mut self,
        header: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.insert(header, content);
        self
    }

    pub fn insert(
        &mut self,
        header: impl Into<String>,
        content: impl Into<String>,
    ) {
        self.files.insert(header.into(), content.into());
    }
}

impl IncludeResolver for InMemoryIncludes {
    fn resolve(
        &self,
        request: &IncludeRequest<'_>,
    ) -> Option<IncludedFile> {
        self.files.get(request.header).map(|content| IncludedFile {
            path: request.header.to_string(),
            content: content.clone(),
        })
    }
}

/// Searches the includer's directory (quoted includes only), then the include paths.
#[derive(Debug, Clone, Default)]
pub struct FileSystemIncludes {
    include_paths: Vec<PathBuf>,
}

impl FileSystemIncludes {
    pub fn new(include_paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            include_paths: include_paths.into_iter().map(Into::into).collect(),
        }
    }

    fn candidates(
        &self,
        request: &IncludeRequest<'_>,
    ) -> Vec<PathBuf> {
        let header = Path::new(request.header);
        if header.is_absolute() {
            return vec![header.to_path_buf()];
        }
        let includer_dir = Path::new(request.includer).parent().map(Path::to_path_buf);
        let mut dirs = Vec::new();
        if request.kind == IncludeKind::Quoted
            && !request.include_next
            && let Some(dir) = &includer_dir
        {
            dirs.push(dir.clone());
        }
        let mut search = self.include_paths.iter();
        if request.include_next
            && let Some(dir) = &includer_dir
            && let Some(position) = self.include_paths.iter().position(|path| dir.starts_with(path))
        {
            search = self.include_paths[position + 1..].iter();
        }
        dirs.extend(search.cloned());
        dirs.into_iter().map(|dir| dir.join(header)).collect()
    }
}

impl IncludeResolver for FileSystemIncludes {
    fn resolve(
        &self,
        request: &IncludeRequest<'_>,
    ) -> Option<IncludedFile> {
        for candidate in self.candidates(request) {
            if !candidate.is_file() {
                continue;
            }
            match std::fs::read_to_string(&candidate) {
                Ok(content) => {
                    tracing::trace!("resolved {} to {}", request.header, candidate.display());
                    return Some(IncludedFile {
                        path: candidate.to_string_lossy().into_owned(),
                        content,
                    });
                },
                Err(err) => {
                    tracing::warn!("failed to read {}: {err}", candidate.display());
                },
            }
        }
        None
    }
}

impl<R: IncludeResolver + ?Sized> IncludeResolver for &R {
    fn resolve(
        &self,
        request: &IncludeRequest<'_>,
    ) -> Option<IncludedFile> {
        (**self).resolve(request)
    }
}

impl<R: IncludeResolver + ?Sized> IncludeResolver for std::sync::Arc<R> {
    fn resolve(
        &self,
        request: &IncludeRequest<'_>,
    ) -> Option<IncludedFile> {
        (**self).resolve(request)
    }
}
