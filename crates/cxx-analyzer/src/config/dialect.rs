use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    C,
    #[default]
    Cpp,
}

impl Language {
    pub fn from_setting_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "c" => Some(Language::C),
            "cpp" | "c++" | "cxx" => Some(Language::Cpp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
        }
    }
}

/// Grammar switches for one parse.
///
/// Passed by reference into every stage; nothing reads dialect state from a global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialectConfig {
    pub language: Language,
    /// GNU statement-expressions, `__attribute__`, `typeof`, nested functions, `<?`/`>?`.
    pub gnu_extensions: bool,
    /// Designated initializers, compound literals, `_Complex`/`_Imaginary`, `restrict`.
    pub c99: bool,
    pub digraphs_trigraphs: bool,
    /// Fail on the first error instead of embedding problem nodes.
    pub strict_recovery: bool,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self::gnu_cpp()
    }
}

impl DialectConfig {
    pub fn c() -> Self {
        Self {
            language: Language::C,
            gnu_extensions: false,
            c99: true,
            digraphs_trigraphs: false,
            strict_recovery: false,
        }
    }

    pub fn gnu_c() -> Self {
        Self {
            gnu_extensions: true,
            ..Self::c()
        }
    }

    pub fn cpp() -> Self {
        Self {
            language: Language::Cpp,
            gnu_extensions: false,
            c99: false,
            digraphs_trigraphs: false,
            strict_recovery: false,
        }
    }

    pub fn gnu_cpp() -> Self {
        Self {
            gnu_extensions: true,
            c99: true,
            ..Self::cpp()
        }
    }

    /// Preset by name: `c`, `gnu-c`, `cpp`, `gnu-cpp`.
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "c" | "c99" => Some(Self::c()),
            "gnu-c" | "gnu" | "gnu99" => Some(Self::gnu_c()),
            "cpp" | "c++" => Some(Self::cpp()),
            "gnu-cpp" | "gnu++" => Some(Self::gnu_cpp()),
            _ => None,
        }
    }

    pub fn strict(self) -> Self {
        Self {
            strict_recovery: true,
            ..self
        }
    }

    pub fn with_digraphs_trigraphs(self) -> Self {
        Self {
            digraphs_trigraphs: true,
            ..self
        }
    }

    pub fn is_cpp(&self) -> bool {
        self.language == Language::Cpp
    }

    pub fn is_c(&self) -> bool {
        self.language == Language::C
    }

    pub(crate) fn apply_patch(
        &mut self,
        patch: DialectConfigPatch,
    ) {
        if let Some(preset) = patch.preset.as_deref().and_then(Self::preset) {
            *self = preset;
        }
        if let Some(language) = patch.language.as_deref().and_then(Language::from_setting_value) {
            self.language = language;
        }
        if let Some(v) = patch.gnu_extensions {
            self.gnu_extensions = v;
        }
        if let Some(v) = patch.c99 {
            self.c99 = v;
        }
        if let Some(v) = patch.digraphs_trigraphs {
            self.digraphs_trigraphs = v;
        }
        if let Some(v) = patch.strict_recovery {
            self.strict_recovery = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct DialectConfigPatch {
    pub(crate) preset: Option<String>,
    pub(crate) language: Option<String>,
    pub(crate) gnu_extensions: Option<bool>,
    pub(crate) c99: Option<bool>,
    pub(crate) digraphs_trigraphs: Option<bool>,
    pub(crate) strict_recovery: Option<bool>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
