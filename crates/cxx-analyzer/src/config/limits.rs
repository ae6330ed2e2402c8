use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

pub const MIN_EXPANDED_TOKENS: usize = 1_024;
pub const MAX_EXPANDED_TOKENS: usize = 64_000_000;
pub const MIN_INCLUDE_DEPTH: usize = 1;
pub const MAX_INCLUDE_DEPTH: usize = 1_024;
pub const MIN_RECOVERIES: usize = 1;
pub const MAX_RECOVERIES: usize = 1_000_000;
pub const MIN_INSTANTIATION_DEPTH: usize = 1;
pub const MAX_INSTANTIATION_DEPTH: usize = 1_024;

/// Resource bounds for one translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Tokens produced by macro replacement before expansion stops.
    pub max_expanded_tokens: usize,
    pub max_include_depth: usize,
    /// Problem nodes emitted in tolerant mode before the rest of the input is abandoned.
    pub max_recoveries: usize,
    /// Nested template instantiation depth followed by the resolver.
    pub max_instantiation_depth: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_expanded_tokens: 8_000_000,
            max_include_depth: 200,
            max_recoveries: 10_000,
            max_instantiation_depth: 64,
        }
    }
}

impl ParseLimits {
    pub(crate) fn apply_patch(
        &mut self,
        patch: ParseLimitsPatch,
    ) {
        if let Some(v) = patch.max_expanded_tokens {
            self.max_expanded_tokens = v;
        }
        if let Some(v) = patch.max_include_depth {
            self.max_include_depth = v;
        }
        if let Some(v) = patch.max_recoveries {
            self.max_recoveries = v;
        }
        if let Some(v) = patch.max_instantiation_depth {
            self.max_instantiation_depth = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.max_expanded_tokens = self.max_expanded_tokens.clamp(MIN_EXPANDED_TOKENS, MAX_EXPANDED_TOKENS);
        self.max_include_depth = self.max_include_depth.clamp(MIN_INCLUDE_DEPTH, MAX_INCLUDE_DEPTH);
        self.max_recoveries = self.max_recoveries.clamp(MIN_RECOVERIES, MAX_RECOVERIES);
        self.max_instantiation_depth =
            self.max_instantiation_depth.clamp(MIN_INSTANTIATION_DEPTH, MAX_INSTANTIATION_DEPTH);
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ParseLimitsPatch {
    pub(crate) max_expanded_tokens: Option<usize>,
    pub(crate) max_include_depth: Option<usize>,
    pub(crate) max_recoveries: Option<usize>,
    pub(crate) max_instantiation_depth: Option<usize>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
