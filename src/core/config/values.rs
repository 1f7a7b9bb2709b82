// ─── Configuration Values ───
// Typed lookups over a YAML values file overlaid by environment variables.

use std::collections::HashMap;
use std::path::Path;

use serde_yaml_ng::Value;
use tracing::debug;

use crate::core::error::{ModError, ModResult};

/// Raw configuration source.
///
/// Lookup order for every accessor: environment (non-empty) first, then the
/// values file, then the caller's default. Values of the wrong shape never
/// get coerced beyond the documented string parsing rules; they fall back to
/// the default instead.
#[derive(Debug, Clone, Default)]
pub struct ConfigValues {
    file: HashMap<String, Value>,
    env: HashMap<String, String>,
}

impl ConfigValues {
    /// Empty source: every lookup returns its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment, no values file.
    pub fn from_process_env() -> Self {
        Self {
            file: HashMap::new(),
            env: std::env::vars().collect(),
        }
    }

    /// Process environment overlaid on the YAML file at `path`.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(path: Option<&Path>) -> ModResult<Self> {
        let values = Self::from_process_env();
        let Some(path) = path else {
            return Ok(values);
        };
        if !path.exists() {
            debug!("Config file {:?} not found, using environment only", path);
            return Ok(values);
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ModError::io(path, e))?;
        values.with_yaml(&raw)
    }

    /// Merge a YAML mapping document into the file layer.
    pub fn with_yaml(mut self, raw: &str) -> ModResult<Self> {
        if raw.trim().is_empty() {
            return Ok(self);
        }
        let parsed: HashMap<String, Value> = serde_yaml_ng::from_str(raw)?;
        self.file.extend(parsed);
        Ok(self)
    }

    /// Set an environment-layer value (highest precedence).
    pub fn with_env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.env.insert(key.to_string(), value.into());
        self
    }

    fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn get_opt_string(&self, key: &str) -> Option<String> {
        if let Some(v) = self.env_value(key) {
            return Some(v.to_string());
        }
        match self.file.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get_opt_string(key)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        if let Some(v) = self.env_value(key) {
            return parse_bool(v).unwrap_or(default);
        }
        match self.file.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => parse_bool(s).unwrap_or(default),
            _ => default,
        }
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        if let Some(v) = self.env_value(key) {
            return v.trim().parse().unwrap_or(default);
        }
        match self.file.get(key) {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }
}

/// `true/1/yes/on` and `false/0/no/off`, case-insensitive.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
