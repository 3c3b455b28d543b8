//! Error type shared by the library and the `compattr` binary.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttributionError {
    #[error("Failed to read input: {0}")]
    InputRead(#[from] io::Error),

    #[error("Failed to parse input JSON: {0}")]
    InputParse(#[from] serde_json::Error),

    #[error("Failed to read task input {path}: {source}")]
    InputFile { path: PathBuf, source: io::Error },

    #[error("Failed to read {path}: {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Configuration directory not found")]
    NoConfigDir,

    #[error("Alias dictionary not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid reserved prefix {prefix:?}: {source}")]
    InvalidPrefix {
        prefix: String,
        source: regex::Error,
    },

    #[error("Model request failed: {0}")]
    ModelTransport(#[from] reqwest::Error),

    #[error("Model endpoint returned HTTP {0}")]
    ModelStatus(u16),

    #[error("Malformed model response: {0}")]
    ModelResponse(String),
}

// ============================================================================
// Tests
// ============================================================================
