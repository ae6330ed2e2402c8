use std::collections::HashMap;
use std::sync::Arc;

use crate::config::DialectConfig;
use crate::pp::token::{PpToken, spell};
use crate::pp::{NoIncludes, Preprocessor};
use crate::vfs::FileLocation;

/// Macros whose value is computed at each use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    File,
    Line,
    /// Predefined by the front end (`__STDC__`, `__cplusplus`, ...).
    Predefined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: Arc<str>,
    /// `None` for object-like macros. A variadic macro's last parameter is
    /// `__VA_ARGS__` or the name given before `...`.
    pub params: Option<Vec<Arc<str>>>,
    pub variadic: bool,
    pub replacement: Vec<PpToken>,
    pub location: Option<FileLocation>,
    pub builtin: Option<Builtin>,
}

impl Macro {
    pub fn object(
        name: impl Into<Arc<str>>,
        replacement: Vec<PpToken>,
    ) -> Self {
        Self {
            name: name.into(),
            params: None,
            variadic: false,
            replacement,
            location: None,
            builtin: None,
        }
    }

    pub fn is_function_like(&self) -> bool {
        self.params.is_some()
    }

    pub(crate) fn param_index(
        &self,
        text: &str,
    ) -> Option<usize> {
        self.params.as_ref()?.iter().position(|param| &**param == text)
    }

    pub(crate) fn variadic_index(&self) -> Option<usize> {
        if !self.variadic {
            return None;
        }
        self.params.as_ref().map(|params| params.len() - 1)
    }

    /// Two definitions are equivalent when parameters and replacement list spell the same.
    pub fn is_equivalent(
        &self,
        other: &Macro,
    ) -> bool {
        self.params == other.params
            && self.variadic == other.variadic
            && self.replacement.len() == other.replacement.len()
            && self.replacement.iter().zip(&other.replacement).enumerate().all(|(i, (a, b))| {
                if i == 0 { a.kind == b.kind && a.text == b.text } else { a.same_spelling(b) }
            })
    }

    /// `NAME(params) replacement`, as it would follow `#define`.
    pub fn definition(&self) -> String {
        let mut out = self.name.to_string();
        if let Some(params) = &self.params {
            out.push('(');
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if self.variadic && i == params.len() - 1 {
                    if &**param == "__VA_ARGS__" {
                        out.push_str("...");
                    } else {
                        out.push_str(param);
                        out.push_str("...");
                    }
                } else {
                    out.push_str(param);
                }
            }
            out.push(')');
        }
        if !self.replacement.is_empty() {
            out.push(' ');
            out.push_str(&spell(&self.replacement));
        }
        out
    }
}

/// Macro definitions by name. A redefinition replaces the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    macros: HashMap<Arc<str>, Arc<Macro>>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in and predefined macros for `dialect`.
    pub fn predefined(dialect: &DialectConfig) -> Self {
        let mut table = Self::new();
        table.insert_builtin("__FILE__", Builtin::File, "");
        table.insert_builtin("__LINE__", Builtin::Line, "");
        table.insert_builtin("__STDC__", Builtin::Predefined, "1");
        table.insert_builtin("__STDC_HOSTED__", Builtin::Predefined, "1");
        if dialect.is_cpp() {
            table.insert_builtin("__cplusplus", Builtin::Predefined, "199711L");
        } else if dialect.c99 {
            table.insert_builtin("__STDC_VERSION__", Builtin::Predefined, "199901L");
        }
        if dialect.gnu_extensions {
            table.insert_builtin("__GNUC__", Builtin::Predefined, "4");
            table.insert_builtin("__GNUC_MINOR__", Builtin::Predefined, "2");
        }
        table
    }

    /// Macros from command-line style definitions: `NAME`, `NAME=VALUE` or `F(x)=body`.
    pub fn from_definitions<S: AsRef<str>>(
        definitions: &[S],
        dialect: &DialectConfig,
    ) -> Self {
        let mut source = String::new();
        for definition in definitions {
            let definition = definition.as_ref().trim();
            if definition.is_empty() {
                continue;
            }
            let (name, value) = definition.split_once('=').unwrap_or((definition, "1"));
            source.push_str("#define ");
            source.push_str(name.trim());
            source.push(' ');
            source.push_str(value);
            source.push('\n');
        }
        let output = Preprocessor::new("<command line>", &source, dialect, &NoIncludes).run();
        for diagnostic in &output.diagnostics {
            tracing::warn!("ignoring malformed macro definition: {diagnostic}");
        }
        let mut table = Self::new();
        for (name, mac) in output.macros.macros {
            if mac.builtin.is_none() {
                table.macros.insert(name, mac);
            }
        }
        table
    }

    fn insert_builtin(
        &mut self,
        name: &str,
        builtin: Builtin,
        value: &str,
    ) {
        let replacement = if value.is_empty() {
            Vec::new()
        } else {
            let kind = crate::syntax::kind::classify_number(value);
            vec![PpToken::new(kind, value, FileLocation::new(crate::vfs::FileId::MAIN, Default::default()))]
        };
        let mut mac = Macro::object(name, replacement);
        mac.builtin = Some(builtin);
        self.macros.insert(Arc::clone(&mac.name), Arc::new(mac));
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Arc<Macro>> {
        self.macros.get(name)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.macros.contains_key(name)
    }

    pub fn insert(
        &mut self,
        mac: Macro,
    ) -> Option<Arc<Macro>> {
        self.macros.insert(Arc::clone(&mac.name), Arc::new(mac))
    }

    pub(crate) fn insert_shared(
        &mut self,
        mac: Arc<Macro>,
    ) {
        self.macros.insert(Arc::clone(&mac.name), mac);
    }

    pub fn remove(
        &mut self,
        name: &str,
    ) -> Option<Arc<Macro>> {
        self.macros.remove(name)
    }

    /// Adds every entry of `other`, replacing same-named entries.
    pub fn extend(
        &mut self,
        other: &MacroTable,
    ) {
        for mac in other.macros.values() {
            self.insert_shared(Arc::clone(mac));
        }
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Macro names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.macros.keys().map(|name| &**name).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &Macro> {
        self.macros.values().map(|mac| &**mac)
    }
}
