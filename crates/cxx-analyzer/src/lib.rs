pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod ide;
pub mod parser;
pub mod pp;
pub mod semantics;
pub mod syntax;
pub mod text_pos;
pub mod vfs;

pub use batch::{BatchError, BatchOutcome, BatchParser, source_files};
pub use config::{AnalyzerSettings, DialectConfig, Language, ParseLimits};
pub use diagnostics::{Diagnostic, ErrorKind, ParseFailure, Severity};
pub use ide::{
    BindingInfo, CompletionContext, CompletionNode, QueryInput, Selection, complete_at, complete_with, parse, select_at,
    select_with,
};
pub use parser::{Parse, parse_file, parse_preprocessed, parse_text};
pub use pp::{FileSystemIncludes, InMemoryIncludes, IncludeResolver, MacroTable, NoIncludes, Preprocessed, Preprocessor};
pub use semantics::{Binding, BindingId, BindingKind, ProblemKind, ScopeId, ScopeKind, Semantics};
