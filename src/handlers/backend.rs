//! Client for the code-assistant HTTP backend.
//!
//! Every route answers `{"status": "success", ...}` on success. Anything
//! else, including transport failures, becomes a [`BackendError`] that is
//! logged here and handed back to the caller.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::BackendConfig;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with a non-success status
    #[error("{0}")]
    Status(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("API response missing {field} property for {context}")]
    MissingField { field: &'static str, context: String },
}

impl BackendError {
    /// Message suitable for an error notification
    pub fn user_message(&self, action: &str) -> String {
        format!("❌ Error fetching AI response for {}: {}", action, self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub file_content: String,
    pub cursor_line: u32,
    pub language_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertRequest {
    pub code: String,
    pub source_language: String,
    pub target_language: String,
}

#[derive(Debug, Clone, Serialize)]
struct CodeRequest<'a> {
    code: &'a str,
    language_id: &'a str,
}

/// Bug analysis decoded from the backend. Falls back to an empty report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Analysis {
    #[serde(default = "default_summary")]
    pub summary: String,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            summary: "No response received from the server.".to_string(),
            issues: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Issue {
    #[serde(rename = "type", default = "default_issue_kind")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_line")]
    pub line: Option<u32>,
    #[serde(default = "default_issue_description")]
    pub description: String,
    #[serde(default)]
    pub fix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OptimizationReport {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub optimizations: Vec<Optimization>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Optimization {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_line")]
    pub line: Option<u32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub optimized: String,
}

fn default_summary() -> String {
    "No detailed summary available".to_string()
}

fn default_issue_kind() -> String {
    "bug".to_string()
}

fn default_issue_description() -> String {
    "No description provided".to_string()
}

/// Line numbers arrive as numbers, numeric strings or junk like "unknown"
fn lenient_line<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

static EMBEDDED_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

static FENCES: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"(?m)^```[\w-]*\n?").unwrap(),
        Regex::new(r"(?m)```$").unwrap(),
        Regex::new(r#"(?m)^['"]{3}[\w-]*\n?"#).unwrap(),
        Regex::new(r#"(?m)['"]{3}$"#).unwrap(),
    ]
});

/// Removes markdown and quote fences around generated code
pub fn strip_code_fences(text: &str) -> String {
    let mut cleaned = text.to_string();
    for fence in FENCES.iter() {
        cleaned = fence.replace_all(&cleaned, "").into_owned();
    }
    cleaned.trim().to_string()
}

/// Decodes an embedded structured payload that may be an object or a string
/// wrapping one. Returns None when nothing usable is found.
fn embedded_object(value: &Value) -> Option<Value> {
    match value {
        Value::Object(_) => Some(value.clone()),
        Value::String(text) => {
            let candidate = EMBEDDED_OBJECT
                .find(text)
                .map(|m| m.as_str())
                .unwrap_or(text);
            serde_json::from_str(candidate).ok()
        }
        _ => None,
    }
}

/// Decodes the `analysis` payload, never failing
pub fn parse_analysis(value: &Value) -> Analysis {
    let Some(object) = embedded_object(value) else {
        warn!("Analysis payload was not a JSON object");
        return Analysis::default();
    };

    serde_json::from_value(object).unwrap_or_else(|e| {
        warn!("Failed to parse analysis result: {}", e);
        Analysis::default()
    })
}

/// Decodes the `optimizations` payload: a bare list or a report object
pub fn parse_optimizations(value: &Value) -> OptimizationReport {
    let parsed = match value {
        Value::Array(_) => serde_json::from_value(value.clone()).map(|optimizations| {
            OptimizationReport {
                summary: None,
                optimizations,
            }
        }),
        other => match embedded_object(other) {
            Some(object) => serde_json::from_value(object),
            None => return OptimizationReport::default(),
        },
    };

    parsed.unwrap_or_else(|e| {
        warn!("Failed to parse optimization result: {}", e);
        OptimizationReport::default()
    })
}

/// Accepts only `status == "success"` bodies
fn check_status(body: Value, route: &str) -> Result<Value, BackendError> {
    if body.get("status").and_then(Value::as_str) == Some("success") {
        return Ok(body);
    }

    let message = body
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Unknown error from backend ({})", route));
    Err(BackendError::Status(message))
}

pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn post<T: Serialize + ?Sized>(&self, route: &str, body: &T) -> Result<Value, BackendError> {
        let url = format!("{}/{}", self.base_url, route);
        debug!("POST {}", url);

        let result: Result<Value, BackendError> = async {
            let response = self.http.post(&url).json(body).send().await?;
            let status = response.status();
            let text = response.text().await?;

            match serde_json::from_str::<Value>(&text) {
                Ok(body) => check_status(body, route),
                Err(_) if !status.is_success() => Err(BackendError::Status(format!(
                    "Backend returned HTTP {} ({})",
                    status.as_u16(),
                    route
                ))),
                Err(_) => Err(BackendError::Status(format!(
                    "Malformed response from backend ({})",
                    route
                ))),
            }
        }
        .await;

        if let Err(e) = &result {
            error!("Backend error ({}): {}", route, e);
        }
        result
    }

    /// Generates code for a comment prompt. Returns cleaned code.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        let body = self.post("generate", request).await?;
        let code = ["refined_code", "response"]
            .iter()
            .filter_map(|key| body.get(*key).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default();

        Ok(strip_code_fences(code))
    }

    pub async fn convert(&self, request: &ConvertRequest) -> Result<String, BackendError> {
        let body = self.post("convert", request).await?;
        match body.get("refined_code").and_then(Value::as_str) {
            Some(code) if !code.is_empty() => Ok(strip_code_fences(code)),
            _ => Err(BackendError::MissingField {
                field: "refined_code",
                context: request.target_language.clone(),
            }),
        }
    }

    pub async fn analyze(&self, code: &str, language_id: &str) -> Result<Analysis, BackendError> {
        let body = self
            .post("analyze", &CodeRequest { code, language_id })
            .await?;
        Ok(body
            .get("analysis")
            .map(parse_analysis)
            .unwrap_or_default())
    }

    pub async fn optimize(
        &self,
        code: &str,
        language_id: &str,
    ) -> Result<OptimizationReport, BackendError> {
        let body = self
            .post("optimize", &CodeRequest { code, language_id })
            .await?;
        Ok(body
            .get("optimizations")
            .map(parse_optimizations)
            .unwrap_or_default())
    }
}
