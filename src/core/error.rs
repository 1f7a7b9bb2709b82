use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the mod installation core.
/// Every module returns `Result<T, ModError>`.
#[derive(Debug, Error)]
pub enum ModError {
    // ── Input ───────────────────────────────────────────
    #[error("invalid mod reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    // ── Catalog ─────────────────────────────────────────
    #[error("catalog authentication failed: {0}")]
    Authentication(String),

    #[error("mod not found: {0}")]
    NotFound(String),

    #[error("no matching file found for mod {mod_id}")]
    NoMatchingFile { mod_id: u64 },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request to {url} failed: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("{algorithm} mismatch for {path:?}: expected {expected}, got {actual}")]
    Integrity {
        path: PathBuf,
        algorithm: &'static str,
        expected: String,
        actual: String,
    },

    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to persist manifest at {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Serialization ───────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    // ── Configuration ───────────────────────────────────
    #[error("configuration error: {0}")]
    Config(String),

    // ── Aggregate ───────────────────────────────────────
    #[error("{count} mod(s) failed to install: {}", references.join(", "))]
    Failures {
        count: usize,
        references: Vec<String>,
    },
}

/// Convenience alias used throughout the crate.
pub type ModResult<T> = Result<T, ModError>;

impl ModError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ModError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_reference(reference: &str, reason: impl Into<String>) -> Self {
        ModError::InvalidReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for ModError {
    fn from(source: std::io::Error) -> Self {
        ModError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
