use std::path::PathBuf;

use newscheck_core::ModelId;
use thiserror::Error;

/// Failure to load the artifact set. Fatal: the process cannot serve.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: unsupported format_version {found} (expected {expected})")]
    Version {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("corrupt artifact {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("model {model} expects {expected} features but the vectorizer produces {actual}")]
    DimensionMismatch {
        model: ModelId,
        expected: usize,
        actual: usize,
    },
}

/// Per-request inference degradation. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("{kind} does not produce class probabilities")]
    ProbabilityUnavailable { kind: &'static str },
}
