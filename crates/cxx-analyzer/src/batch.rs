//! Concurrent parsing of independent translation units.
//!
//! Every unit gets its own preprocessor, macro table and tree on whichever
//! worker picks it up. Workers share only the settings, read-only, and the
//! result store.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

use crate::config::AnalyzerSettings;
use crate::diagnostics::ParseFailure;
use crate::parser::{Parse, parse_preprocessed};
use crate::pp::{FileSystemIncludes, MacroTable, Preprocessor};

/// Extensions of files picked up when walking a directory.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "h", "cc", "cpp", "cxx", "c++", "hh", "hpp", "hxx", "i", "ii"];

#[derive(Debug)]
pub enum BatchError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Strict recovery stopped at the first error.
    Parse {
        path: PathBuf,
        failure: ParseFailure,
    },
}

impl fmt::Display for BatchError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            BatchError::Io {
                path,
                source,
            } => write!(f, "failed to read {}: {source}", path.display()),
            BatchError::Parse {
                path,
                failure,
            } => write!(f, "{}: {failure}", path.display()),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::Io {
                source,
                ..
            } => Some(source),
            BatchError::Parse {
                failure,
                ..
            } => Some(failure),
        }
    }
}

/// Outcome of one unit, in the order the units were given.
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: Result<Arc<Parse>, BatchError>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Parses many translation units on a worker pool and keeps the parses by path.
pub struct BatchParser {
    settings: AnalyzerSettings,
    macros: MacroTable,
    resolver: FileSystemIncludes,
    parses: DashMap<PathBuf, Arc<Parse>>,
}

impl BatchParser {
    pub fn new(settings: AnalyzerSettings) -> Self {
        let macros = settings.preprocessor.macro_table(&settings.dialect);
        let resolver = settings.preprocessor.include_resolver();
        Self {
            settings,
            macros,
            resolver,
            parses: DashMap::new(),
        }
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Reads and parses `paths` concurrently.
    pub fn parse_files<P: AsRef<Path> + Sync>(
        &self,
        paths: &[P],
    ) -> Vec<BatchOutcome> {
        self.run(paths, |path| {
            let path = path.as_ref();
            let result = match std::fs::read_to_string(path) {
                Ok(text) => self.parse_source(path, &text),
                Err(source) => Err(BatchError::Io {
                    path: path.to_path_buf(),
                    source,
                }),
            };
            BatchOutcome {
                path: path.to_path_buf(),
                result,
            }
        })
    }

    /// Parses in-memory units concurrently; includes still go to the file system.
    pub fn parse_sources(
        &self,
        sources: &[(PathBuf, String)],
    ) -> Vec<BatchOutcome> {
        self.run(sources, |(path, text)| BatchOutcome {
            path: path.clone(),
            result: self.parse_source(path, text),
        })
    }

    /// Parses one unit on the calling thread and stores the parse.
    pub fn parse_source(
        &self,
        path: &Path,
        text: &str,
    ) -> Result<Arc<Parse>, BatchError> {
        let name = path.to_string_lossy();
        let dialect = &self.settings.dialect;
        let limits = &self.settings.limits;
        let preprocessed = Preprocessor::new(&name, text, dialect, &self.resolver)
            .with_macros(&self.macros)
            .with_limits(*limits)
            .run();
        let parse = parse_preprocessed(preprocessed, dialect, limits).map_err(|failure| BatchError::Parse {
            path: path.to_path_buf(),
            failure,
        })?;
        let parse = Arc::new(parse);
        self.parses.insert(path.to_path_buf(), Arc::clone(&parse));
        Ok(parse)
    }

    pub fn get(
        &self,
        path: &Path,
    ) -> Option<Arc<Parse>> {
        self.parses.get(path).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(
        &self,
        path: &Path,
    ) -> Option<Arc<Parse>> {
        self.parses.remove(path).map(|(_, parse)| parse)
    }

    /// Stored paths in sorted order.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.parses.iter().map(|entry| entry.key().clone()).collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.parses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parses.is_empty()
    }

    fn run<T: Sync>(
        &self,
        items: &[T],
        parse_one: impl Fn(&T) -> BatchOutcome + Sync + Send,
    ) -> Vec<BatchOutcome> {
        let threads = self.settings.thread_pool.resolved_worker_threads();
        let _span = tracing::debug_span!("batch", units = items.len(), threads).entered();
        let outcomes: Vec<BatchOutcome> = if items.len() <= 1 || threads == 1 {
            items.iter().map(&parse_one).collect()
        } else {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|index| format!("cxx-parse-{index}"))
                .build()
            {
                Ok(pool) => pool.install(|| items.par_iter().map(&parse_one).collect()),
                Err(err) => {
                    tracing::warn!("failed to create thread pool ({err}), parsing sequentially");
                    items.iter().map(&parse_one).collect()
                },
            }
        };
        let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
        tracing::debug!(units = outcomes.len(), failed, "batch finished");
        outcomes
    }
}

/// C and C++ sources under `root`, sorted; hidden and build directories are skipped.
pub fn source_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(should_descend)
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
        })
        .collect();
    files.sort();
    files
}

fn should_descend(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let Some(name) = entry.file_name().to_str() else {
        return false;
    };
    !name.starts_with('.') && !matches!(name, "target" | "build" | "node_modules" | "out" | "obj")
}

#[cfg(test)]
#[path = "../tests/src/batch_tests.rs"]
mod tests;
