//! Model fallback: a local Ollama-compatible text-completion service.
//!
//! Wire contract:
//! - `GET  /api/tags`      200 means available
//! - `POST /api/generate`  `{model, prompt, stream: false, options}` → `{response}`
//!
//! `response` should hold a JSON array of component names, possibly wrapped in
//! a Markdown code fence.

use crate::config::ModelConfig;
use crate::error::AttributionError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

const TAGS_PATH: &str = "/api/tags";
const GENERATE_PATH: &str = "/api/generate";

const EXTRACTION_PROMPT: &str = r#"You extract UI component names from bug reports.
Read the text below and list every user interface component it mentions
(for example: button, modal, dropdown, datatable, date picker, tooltip).
Respond with ONLY a JSON array of strings, e.g. ["datatable", "tooltip"].
Respond with [] if no UI component is mentioned. No commentary.

Text:
"#;

/// Seam between the attribution service and the model backend
pub trait ModelClient: Send + Sync {
    /// Health probe; never fails, unreachable means `false`
    fn is_available(&self, config: &ModelConfig) -> bool;

    /// Component names the model finds in `text`
    ///
    /// # Errors
    ///
    /// Transport failures, non-success status and malformed responses.
    fn extract_components(
        &self,
        text: &str,
        config: &ModelConfig,
    ) -> Result<Vec<String>, AttributionError>;

    /// Name for logging
    fn name(&self) -> &'static str;
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

// ============================================================================
// Ollama Client
// ============================================================================

/// Blocking HTTP client for the local model service
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http_client: Client,
}

impl OllamaClient {
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, AttributionError> {
        let http_client = Client::builder().build()?;
        Ok(Self { http_client })
    }

    /// Prompt sent for `text`
    pub fn build_prompt(text: &str) -> String {
        format!("{}{}", EXTRACTION_PROMPT, text.trim())
    }
}

impl ModelClient for OllamaClient {
    fn is_available(&self, config: &ModelConfig) -> bool {
        let url = config.endpoint(TAGS_PATH);
        match self
            .http_client
            .get(&url)
            .timeout(config.probe_timeout())
            .send()
        {
            Ok(response) if response.status() == reqwest::StatusCode::OK => true,
            Ok(response) => {
                debug!("Model probe {} returned {}", url, response.status());
                false
            }
            Err(e) => {
                debug!("Model probe {} failed: {}", url, e);
                false
            }
        }
    }

    fn extract_components(
        &self,
        text: &str,
        config: &ModelConfig,
    ) -> Result<Vec<String>, AttributionError> {
        let request = GenerateRequest {
            model: &config.model,
            prompt: Self::build_prompt(text),
            stream: false,
            options: GenerateOptions {
                temperature: 0.0,
                num_predict: config.num_predict(),
            },
        };

        let response = self
            .http_client
            .post(config.endpoint(GENERATE_PATH))
            .timeout(config.request_timeout())
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttributionError::ModelStatus(status.as_u16()));
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| AttributionError::ModelResponse(e.to_string()))?;

        parse_model_response(&body.response)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Strip an optional Markdown fence and keep the string elements of the
/// JSON array inside
pub fn parse_model_response(text: &str) -> Result<Vec<String>, AttributionError> {
    let json_str = strip_code_fence(text);

    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| AttributionError::ModelResponse(format!("not JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(AttributionError::ModelResponse(
            "expected a JSON array".to_string(),
        ));
    };

    let names: Vec<String> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            other => {
                warn!("Ignoring non-string model output element: {}", other);
                None
            }
        })
        .collect();

    Ok(names)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    trimmed
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

// ============================================================================
// Tests
// ============================================================================
