//! Declarative configuration.
//!
//! Settings are split into one file per category. [`AnalyzerSettings`]
//! aggregates all categories and merges partial JSON payloads or
//! `cxx-analyzer.toml` files into the defaults.

pub(crate) mod dialect;
pub(crate) mod file;
pub(crate) mod limits;
pub(crate) mod logging;
pub(crate) mod preprocessor;
pub(crate) mod schema;
pub(crate) mod thread_pool;

use std::collections::HashMap;
use std::path::Path;

pub use dialect::{DialectConfig, Language};
use dialect::DialectConfigPatch;
pub use file::{CONFIG_FILENAME, ConfigError, find_config_file};
pub use limits::{
    MAX_EXPANDED_TOKENS, MAX_INCLUDE_DEPTH, MAX_INSTANTIATION_DEPTH, MAX_RECOVERIES, MIN_EXPANDED_TOKENS,
    MIN_INCLUDE_DEPTH, MIN_INSTANTIATION_DEPTH, MIN_RECOVERIES, ParseLimits,
};
use limits::ParseLimitsPatch;
use logging::LoggingSettingsPatch;
pub use logging::{LogLevel, LoggingSettings};
pub use preprocessor::PreprocessorSettings;
use preprocessor::PreprocessorSettingsPatch;
pub use schema::{SchemaField, SchemaType, generate_configuration_markdown, generate_schema_properties, schema_fields};
use serde::Deserialize;
use serde_json::Value;
pub use thread_pool::{MAX_WORKER_THREADS, MIN_WORKER_THREADS, ThreadPoolSettings};
use thread_pool::ThreadPoolSettingsPatch;

pub const SETTINGS_SECTION_KEY: &str = "cxx-analyzer";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalyzerSettings {
    pub dialect: DialectConfig,
    pub preprocessor: PreprocessorSettings,
    pub limits: ParseLimits,
    pub logging: LoggingSettings,
    pub thread_pool: ThreadPoolSettings,
}

impl AnalyzerSettings {
    pub fn from_payload(payload: Option<&Value>) -> Self {
        let mut settings = Self::default();
        if let Some(payload) = payload {
            settings = settings.merged_with_payload(payload);
        }
        settings
    }

    pub fn merged_with_payload(
        &self,
        payload: &Value,
    ) -> Self {
        let mut merged = self.clone();

        for candidate in payload_candidates(payload) {
            match serde_json::from_value::<AnalyzerSettingsPatch>(candidate.clone()) {
                Ok(patch) => merged.apply_patch(patch),
                Err(err) => tracing::warn!("ignoring malformed settings section: {err}"),
            }
        }

        merged.normalize();
        merged
    }

    /// Merges a `cxx-analyzer.toml` document.
    pub fn merged_with_toml(
        &self,
        content: &str,
    ) -> Result<Self, ConfigError> {
        let value = file::toml_to_value(content).map_err(|source| ConfigError::Toml {
            path: CONFIG_FILENAME.into(),
            source,
        })?;
        Ok(self.merged_with_payload(&value))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let value = file::read_settings_value(path)?;
        Ok(Self::default().merged_with_payload(&value))
    }

    /// Settings from the nearest `cxx-analyzer.toml` above `start`, or defaults.
    pub fn discover(start: &Path) -> Result<Self, ConfigError> {
        match find_config_file(start) {
            Some(path) => {
                tracing::debug!("using settings from {}", path.display());
                Self::load(&path)
            },
            None => Ok(Self::default()),
        }
    }

    fn apply_patch(
        &mut self,
        patch: AnalyzerSettingsPatch,
    ) {
        if let Some(p) = patch.dialect {
            self.dialect.apply_patch(p);
        }
        if let Some(p) = patch.preprocessor {
            self.preprocessor.apply_patch(p);
        }
        if let Some(p) = patch.limits {
            self.limits.apply_patch(p);
        }
        if let Some(p) = patch.logging {
            self.logging.apply_patch(p);
        }
        if let Some(p) = patch.thread_pool {
            self.thread_pool.apply_patch(p);
        }
    }

    fn normalize(&mut self) {
        self.preprocessor.normalize();
        self.limits.normalize();
        self.thread_pool.normalize();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct AnalyzerSettingsPatch {
    dialect: Option<DialectConfigPatch>,
    preprocessor: Option<PreprocessorSettingsPatch>,
    limits: Option<ParseLimitsPatch>,
    logging: Option<LoggingSettingsPatch>,
    thread_pool: Option<ThreadPoolSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

fn payload_candidates(payload: &Value) -> Vec<Value> {
    let mut candidates = Vec::new();
    candidates.push(payload.clone());
    if let Some(scoped) = payload.get(SETTINGS_SECTION_KEY) {
        candidates.push(scoped.clone());
    }
    candidates
}

#[cfg(test)]
#[path = "../../tests/src/config/settings_tests.rs"]
mod tests;
