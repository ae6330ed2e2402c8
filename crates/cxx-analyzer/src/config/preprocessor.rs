use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::config::DialectConfig;
use crate::pp::{FileSystemIncludes, MacroTable};

/// Command-line style inputs to the preprocessor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreprocessorSettings {
    pub include_paths: Vec<String>,
    /// `NAME` or `NAME=VALUE`, as with `-D`.
    pub defines: Vec<String>,
    /// Names removed after the defines are applied, as with `-U`.
    pub undefines: Vec<String>,
}

impl PreprocessorSettings {
    /// The `-D` definitions with the `-U` names removed.
    pub fn macro_table(
        &self,
        dialect: &DialectConfig,
    ) -> MacroTable {
        let mut table = MacroTable::from_definitions(&self.defines, dialect);
        for name in &self.undefines {
            table.remove(name);
        }
        table
    }

    pub fn include_resolver(&self) -> FileSystemIncludes {
        FileSystemIncludes::new(&self.include_paths)
    }

    pub(crate) fn apply_patch(
        &mut self,
        patch: PreprocessorSettingsPatch,
    ) {
        if let Some(v) = patch.include_paths {
            self.include_paths = v;
        }
        if let Some(v) = patch.defines {
            self.defines = v;
        }
        if let Some(v) = patch.undefines {
            self.undefines = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.include_paths = trimmed(&self.include_paths);
        self.defines = trimmed(&self.defines);
        self.undefines = trimmed(&self.undefines);
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).collect()
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct PreprocessorSettingsPatch {
    pub(crate) include_paths: Option<Vec<String>>,
    pub(crate) defines: Option<Vec<String>>,
    pub(crate) undefines: Option<Vec<String>>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
