//! Engine configuration.
//!
//! Values are layered: built-in defaults, then an optional JSON config file,
//! then environment variables. The CLI applies its flags on top.

use crate::error::AttributionError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Directory name under the platform config dir
const CONFIG_DIR: &str = "component-attributor";

/// Default alias dictionary file name
const ALIASES_FILE: &str = "component-aliases.json";

/// Default component-library namespace token
pub const DEFAULT_RESERVED_PREFIX: &str = "cfa";

/// Local text-completion service
pub const DEFAULT_MODEL_URL: &str = "http://localhost:11434";

pub const DEFAULT_MODEL: &str = "llama3.2";

/// Upper bound on generated tokens for the extraction call
pub const MAX_NUM_PREDICT: u32 = 100;

const ENV_ALIASES: &str = "COMPATTR_ALIASES";
const ENV_PREFIX: &str = "COMPATTR_PREFIX";
const ENV_MODEL_URL: &str = "OLLAMA_HOST";
const ENV_MODEL: &str = "COMPATTR_MODEL";
const ENV_WORKERS: &str = "COMPATTR_WORKERS";

// ============================================================================
// Config Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttributorConfig {
    /// Alias dictionary JSON; falls back to the platform config dir
    pub aliases_path: Option<PathBuf>,

    /// Namespace token of the first-party component library
    pub reserved_prefix: String,

    /// Run the generic kebab-case extractor when every other strategy fails
    pub generic_terms_fallback: bool,

    pub model: ModelConfig,

    pub batch: BatchOptions,
}

impl Default for AttributorConfig {
    fn default() -> Self {
        Self {
            aliases_path: None,
            reserved_prefix: DEFAULT_RESERVED_PREFIX.to_string(),
            generic_terms_fallback: false,
            model: ModelConfig::default(),
            batch: BatchOptions::default(),
        }
    }
}

/// Connection settings for the model fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub probe_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub num_predict: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MODEL_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            probe_timeout_secs: 3,
            request_timeout_secs: 30,
            num_predict: MAX_NUM_PREDICT,
        }
    }
}

impl ModelConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn num_predict(&self) -> u32 {
        self.num_predict.min(MAX_NUM_PREDICT)
    }

    /// Join an API path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchOptions {
    /// 1 = sequential
    pub workers: usize,

    /// Attribute each distinct (hint, title, description) once per batch
    pub memoize: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            memoize: false,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl AttributorConfig {
    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self, AttributionError> {
        let content = fs::read_to_string(path).map_err(|e| AttributionError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| AttributionError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply environment overrides
    pub fn with_env(mut self) -> Self {
        if let Some(path) = env_value(ENV_ALIASES) {
            self.aliases_path = Some(PathBuf::from(path));
        }
        if let Some(prefix) = env_value(ENV_PREFIX) {
            self.reserved_prefix = prefix;
        }
        if let Some(url) = env_value(ENV_MODEL_URL) {
            self.model.base_url = normalize_host(&url);
        }
        if let Some(model) = env_value(ENV_MODEL) {
            self.model.model = model;
        }
        if let Some(workers) = env_value(ENV_WORKERS).and_then(|w| w.parse().ok()) {
            self.batch.workers = workers;
        }
        self
    }

    /// Explicit aliases path, or the platform default
    pub fn resolve_aliases_path(&self) -> Result<PathBuf, AttributionError> {
        match &self.aliases_path {
            Some(path) => Ok(path.clone()),
            None => default_aliases_path(),
        }
    }
}

/// `<config dir>/component-attributor/component-aliases.json`
pub fn default_aliases_path() -> Result<PathBuf, AttributionError> {
    let dir = dirs::config_dir().ok_or(AttributionError::NoConfigDir)?;
    Ok(dir.join(CONFIG_DIR).join(ALIASES_FILE))
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// OLLAMA_HOST is commonly set without a scheme
fn normalize_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

// ============================================================================
// Tests
// ============================================================================
