//! Query services over a single buffer: full parse, selection of the node
//! covering a span, and completion at a caret.
//!
//! Every query parses from scratch. Results are plain snapshots that no
//! longer need the [`Semantics`] that produced them.

mod completion;
mod selection;

pub use completion::{CompletionContext, CompletionNode, complete_at, complete_in, complete_with};
pub use selection::{Selection, select_at, select_in, select_with};

use crate::config::{AnalyzerSettings, DialectConfig, ParseLimits};
use crate::diagnostics::ParseFailure;
use crate::parser::{Parse, parse_preprocessed};
use crate::pp::{IncludeResolver, MacroTable, NoIncludes, Preprocessor};
use crate::semantics::{BindingId, BindingKind, ProblemKind, Semantics};
use crate::syntax::cst::SyntaxNode;

static NO_INCLUDES: NoIncludes = NoIncludes;

/// Full parse of a self-contained buffer; the root's declarations are in
/// source order.
pub fn parse(
    text: &str,
    dialect: &DialectConfig,
) -> Result<Parse, ParseFailure> {
    QueryInput::new(*dialect).parse(text)
}

/// How a query buffer is named, preprocessed and parsed.
#[derive(Clone)]
pub struct QueryInput<'r> {
    pub path: &'r str,
    pub dialect: DialectConfig,
    pub limits: ParseLimits,
    /// Command-line style macros added to the predefined ones.
    pub macros: MacroTable,
    pub resolver: &'r dyn IncludeResolver,
}

impl QueryInput<'static> {
    pub fn new(dialect: DialectConfig) -> Self {
        Self {
            path: "<main>",
            dialect,
            limits: ParseLimits::default(),
            macros: MacroTable::new(),
            resolver: &NO_INCLUDES,
        }
    }
}

impl Default for QueryInput<'static> {
    fn default() -> Self {
        Self::new(DialectConfig::default())
    }
}

impl<'r> QueryInput<'r> {
    /// Dialect, limits and macros from `settings`; headers come from `resolver`.
    pub fn from_settings(
        path: &'r str,
        settings: &AnalyzerSettings,
        resolver: &'r dyn IncludeResolver,
    ) -> Self {
        Self {
            path,
            dialect: settings.dialect,
            limits: settings.limits,
            macros: settings.preprocessor.macro_table(&settings.dialect),
            resolver,
        }
    }

    pub fn parse(
        &self,
        text: &str,
    ) -> Result<Parse, ParseFailure> {
        let preprocessed = self.preprocessor(text, &self.dialect).run();
        parse_preprocessed(preprocessed, &self.dialect, &self.limits)
    }

    fn preprocessor<'t>(
        &'t self,
        text: &str,
        dialect: &DialectConfig,
    ) -> Preprocessor<'t> {
        Preprocessor::new(self.path, text, dialect, self.resolver)
            .with_macros(&self.macros)
            .with_limits(self.limits)
    }
}

/// A binding as seen by a query: its names, kind and, for typed entities,
/// the rendered type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingInfo {
    pub id: BindingId,
    pub name: String,
    pub qualified_name: String,
    pub kind: BindingKind,
    pub detail: Option<String>,
    /// Qualified names of what an ambiguous or conflicting lookup found.
    pub candidates: Vec<String>,
}

impl BindingInfo {
    /// `node` is the name the binding was found for; it decides how a
    /// member's type reads through a specialization.
    pub(crate) fn new(
        semantics: &Semantics,
        id: BindingId,
        node: &SyntaxNode,
    ) -> Self {
        let binding = semantics.binding(id);
        let detail = match binding.kind {
            BindingKind::Variable
            | BindingKind::Field
            | BindingKind::Parameter
            | BindingKind::Function
            | BindingKind::Enumerator
            | BindingKind::Typedef => Some(semantics.type_at(id, node).to_string()),
            _ => None,
        };
        Self {
            id,
            name: binding.name.clone(),
            qualified_name: semantics.qualified_name(id),
            kind: binding.kind,
            detail,
            candidates: binding.candidates.iter().map(|&candidate| semantics.qualified_name(candidate)).collect(),
        }
    }

    pub fn problem(&self) -> Option<ProblemKind> {
        match self.kind {
            BindingKind::Problem(problem) => Some(problem),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/ide/ide_tests.rs"]
mod tests;
