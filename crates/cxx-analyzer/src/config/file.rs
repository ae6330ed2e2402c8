use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

pub const CONFIG_FILENAME: &str = "cxx-analyzer.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConfigError::Io {
                path,
                source,
            } => write!(f, "failed to read {}: {source}", path.display()),
            ConfigError::Toml {
                path,
                source,
            } => write!(f, "failed to parse {}: {source}", path.display()),
            ConfigError::Json(err) => write!(f, "invalid settings payload: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io {
                source,
                ..
            } => Some(source),
            ConfigError::Toml {
                source,
                ..
            } => Some(source),
            ConfigError::Json(err) => Some(err),
        }
    }
}

/// Walks parent directories from `start` looking for `cxx-analyzer.toml`.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?
    } else {
        start
    };
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Reads a TOML settings file into the JSON shape accepted by the settings patches.
pub(crate) fn read_settings_value(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml_to_value(&content).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn toml_to_value(content: &str) -> Result<Value, toml::de::Error> {
    let table: toml::Value = toml::from_str(content)?;
    Ok(convert(table))
}

fn convert(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(convert).collect()),
        toml::Value::Table(table) => Value::Object(table.into_iter().map(|(k, v)| (k, convert(v))).collect()),
    }
}
