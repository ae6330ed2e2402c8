use serde_json::Value;

use crate::config::{
    SETTINGS_SECTION_KEY,
    limits::{
        MAX_EXPANDED_TOKENS, MAX_INCLUDE_DEPTH, MAX_INSTANTIATION_DEPTH, MAX_RECOVERIES, MIN_EXPANDED_TOKENS,
        MIN_INCLUDE_DEPTH, MIN_INSTANTIATION_DEPTH, MIN_RECOVERIES,
    },
    thread_pool::MAX_WORKER_THREADS,
};

/// One entry in the generated configuration schema.
#[derive(Debug, Clone)]
pub struct SchemaField {
    pub key: String,
    pub description: String,
    pub schema_type: SchemaType,
    pub default: Value,
}

/// Subset of JSON Schema types we support.
#[derive(Debug, Clone)]
pub enum SchemaType {
    Bool,
    String,
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    StringEnum {
        values: Vec<&'static str>,
    },
    StringArray,
}

impl SchemaField {
    pub fn to_schema_value(&self) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert("markdownDescription".into(), Value::String(self.description.clone()));
        obj.insert("default".into(), self.default.clone());

        match &self.schema_type {
            SchemaType::Bool => {
                obj.insert("type".into(), Value::String("boolean".into()));
            },
            SchemaType::String => {
                obj.insert("type".into(), Value::String("string".into()));
            },
            SchemaType::Integer {
                minimum,
                maximum,
            } => {
                obj.insert("type".into(), Value::String("number".into()));
                if let Some(min) = minimum {
                    obj.insert("minimum".into(), Value::Number((*min).into()));
                }
                if let Some(max) = maximum {
                    obj.insert("maximum".into(), Value::Number((*max).into()));
                }
            },
            SchemaType::StringEnum {
                values,
            } => {
                obj.insert("type".into(), Value::String("string".into()));
                obj.insert("enum".into(), Value::Array(values.iter().map(|v| Value::String(v.to_string())).collect()));
            },
            SchemaType::StringArray => {
                obj.insert("type".into(), Value::String("array".into()));
                let mut items = serde_json::Map::new();
                items.insert("type".into(), Value::String("string".into()));
                obj.insert("items".into(), Value::Object(items));
            },
        }

        Value::Object(obj)
    }

    pub fn to_markdown(&self) -> String {
        format!("- `{}` - {} (default: `{}`)", self.key, self.description, self.default)
    }
}

/// Return the full list of schema fields for every setting.
pub fn schema_fields() -> Vec<SchemaField> {
    vec![
        SchemaField {
            key: "dialect.preset".into(),
            description: "Start from a named dialect before applying the individual switches.".into(),
            schema_type: SchemaType::StringEnum {
                values: vec!["c", "gnu-c", "cpp", "gnu-cpp"],
            },
            default: Value::String("gnu-cpp".into()),
        },
        SchemaField {
            key: "dialect.language".into(),
            description: "Source language of translation units.".into(),
            schema_type: SchemaType::StringEnum {
                values: vec!["c", "cpp"],
            },
            default: Value::String("cpp".into()),
        },
        SchemaField {
            key: "dialect.gnuExtensions".into(),
            description: "Accept GNU statement-expressions, `__attribute__`, `typeof`, nested functions and \
                           the `<?`/`>?` operators."
                .into(),
            schema_type: SchemaType::Bool,
            default: Value::Bool(true),
        },
        SchemaField {
            key: "dialect.c99".into(),
            description: "Accept designated initializers, compound literals, `_Complex`, `_Imaginary` and \
                           `restrict`."
                .into(),
            schema_type: SchemaType::Bool,
            default: Value::Bool(true),
        },
        SchemaField {
            key: "dialect.digraphsTrigraphs".into(),
            description: "Replace trigraphs and digraphs before tokenization.".into(),
            schema_type: SchemaType::Bool,
            default: Value::Bool(false),
        },
        SchemaField {
            key: "dialect.strictRecovery".into(),
            description: "Stop at the first error instead of embedding problem nodes.".into(),
            schema_type: SchemaType::Bool,
            default: Value::Bool(false),
        },
        SchemaField {
            key: "preprocessor.includePaths".into(),
            description: "Directories searched for `#include` directives.".into(),
            schema_type: SchemaType::StringArray,
            default: Value::Array(vec![]),
        },
        SchemaField {
            key: "preprocessor.defines".into(),
            description: "Predefined macros, `NAME` or `NAME=VALUE`.".into(),
            schema_type: SchemaType::StringArray,
            default: Value::Array(vec![]),
        },
        SchemaField {
            key: "preprocessor.undefines".into(),
            description: "Macros removed after the predefined ones are applied.".into(),
            schema_type: SchemaType::StringArray,
            default: Value::Array(vec![]),
        },
        SchemaField {
            key: "limits.maxExpandedTokens".into(),
            description: "Tokens produced by macro replacement before expansion stops.".into(),
            schema_type: SchemaType::Integer {
                minimum: Some(MIN_EXPANDED_TOKENS as i64),
                maximum: Some(MAX_EXPANDED_TOKENS as i64),
            },
            default: Value::Number(8_000_000.into()),
        },
        SchemaField {
            key: "limits.maxIncludeDepth".into(),
            description: "Maximum nesting of `#include` directives.".into(),
            schema_type: SchemaType::Integer {
                minimum: Some(MIN_INCLUDE_DEPTH as i64),
                maximum: Some(MAX_INCLUDE_DEPTH as i64),
            },
            default: Value::Number(200.into()),
        },
        SchemaField {
            key: "limits.maxRecoveries".into(),
            description: "Problem nodes emitted in tolerant mode before the remaining input is skipped.".into(),
            schema_type: SchemaType::Integer {
                minimum: Some(MIN_RECOVERIES as i64),
                maximum: Some(MAX_RECOVERIES as i64),
            },
            default: Value::Number(10_000.into()),
        },
        SchemaField {
            key: "limits.maxInstantiationDepth".into(),
            description: "Nested template instantiations followed by the binding resolver.".into(),
            schema_type: SchemaType::Integer {
                minimum: Some(MIN_INSTANTIATION_DEPTH as i64),
                maximum: Some(MAX_INSTANTIATION_DEPTH as i64),
            },
            default: Value::Number(64.into()),
        },
        SchemaField {
            key: "logging.level".into(),
            description: "Runtime logging verbosity.".into(),
            schema_type: SchemaType::StringEnum {
                values: vec!["error", "warn", "info", "debug", "trace"],
            },
            default: Value::String("info".into()),
        },
        SchemaField {
            key: "logging.file".into(),
            description: "Also write logs to this file.".into(),
            schema_type: SchemaType::String,
            default: Value::String(String::new()),
        },
        SchemaField {
            key: "threadPool.workerThreads".into(),
            description: "Batch parsing pool size. `0` uses `available_parallelism`.".into(),
            schema_type: SchemaType::Integer {
                minimum: Some(0),
                maximum: Some(MAX_WORKER_THREADS as i64),
            },
            default: Value::Number(0.into()),
        },
    ]
}

/// Generate a JSON schema `"properties"` object for every setting.
pub fn generate_schema_properties() -> Value {
    let mut properties = serde_json::Map::new();
    for field in schema_fields() {
        let full_key = format!("{SETTINGS_SECTION_KEY}.{}", field.key);
        properties.insert(full_key, field.to_schema_value());
    }
    Value::Object(properties)
}

/// Generate markdown documentation for all settings.
pub fn generate_configuration_markdown() -> String {
    let mut out = String::new();
    let fields = schema_fields();

    let mut current_section = String::new();
    for field in &fields {
        let section = field.key.split('.').next().unwrap_or("");
        if section != current_section {
            current_section = section.to_string();
            let title = match section {
                "dialect" => "Dialect",
                "preprocessor" => "Preprocessor",
                "limits" => "Limits",
                "logging" => "Logging",
                "threadPool" => "Thread Pool",
                other => other,
            };
            out.push_str(&format!("\n## {title}\n\n"));
        }
        out.push_str(&field.to_markdown());
        out.push('\n');
    }

    out
}
