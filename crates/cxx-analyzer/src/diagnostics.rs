//! Error taxonomy shared by the preprocessor, the parser and the query layer.

use std::fmt;

use crate::vfs::FileLocation;

/// Which stage of the front end produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// Malformed token, e.g. an unterminated string literal.
    Lex,
    /// Malformed directive, unresolved include, macro redefinition conflict.
    Preprocessor,
    /// Grammar violation.
    Syntax,
    /// Every speculative interpretation of an ambiguous construct failed.
    AmbiguityExhausted,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Lex => "lex error",
            ErrorKind::Preprocessor => "preprocessor error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::AmbiguityExhausted => "ambiguity exhausted",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let text = match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: String,
    pub location: Option<FileLocation>,
}

impl Diagnostic {
    pub fn error(
        kind: ErrorKind,
        message: impl Into<String>,
        location: Option<FileLocation>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            message: message.into(),
            location,
        }
    }

    pub fn warning(
        kind: ErrorKind,
        message: impl Into<String>,
        location: Option<FileLocation>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
            location,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity >= Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} ({}): {}", self.severity, self.kind, self.message)
    }
}

/// Result of a strict parse that hit its first error.
///
/// Callers branch on [`ParseFailure::kind`]; the message is informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    diagnostic: Diagnostic,
}

impl ParseFailure {
    pub(crate) fn from_first_error(first: &Diagnostic) -> Self {
        Self {
            diagnostic: Diagnostic {
                severity: Severity::Fatal,
                ..first.clone()
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.diagnostic.kind
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.diagnostic
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "FAILURE: {}", self.diagnostic)
    }
}

impl std::error::Error for ParseFailure {}
