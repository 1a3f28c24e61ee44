use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, error, debug};

use crate::catalyst::{Catalyst, ScoutReport};
use crate::error::{Result, ScoutError};
use super::prompt::{self, PromptContext};

/// Anything that can produce a `ScoutReport` for a given prompt context.
#[async_trait]
pub trait CatalystSource: Send + Sync {
    async fn scout(&self, context: &PromptContext) -> Result<ScoutReport>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    tools: Vec<Value>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Gemini `generateContent` client with Google Search grounding and structured output.
pub struct GeminiScout {
    api_key: Option<String>,
    model_id: String,
    api_base: String,
    client: Client,
}

impl GeminiScout {
    pub fn new(api_key: Option<String>, model_id: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            api_key,
            model_id: model_id.into(),
            api_base: api_base.into(),
            client: Client::new(),
        }
    }

    fn build_request(&self, context: &PromptContext) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: Some(prompt::system_instruction(context)) }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt::user_prompt(context)) }],
            }],
            tools: vec![json!({ "google_search": {} })],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: prompt::response_schema(),
            },
        }
    }
}

#[async_trait]
impl CatalystSource for GeminiScout {
    async fn scout(&self, context: &PromptContext) -> Result<ScoutReport> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ScoutError::config_error("GEMINI_API_KEY is not set"))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model_id
        );

        info!("Querying {} for catalysts since {}", self.model_id, context.window_start());

        let response = self.client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&self.build_request(context))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Model API returned {}: {}", status, body);
            return Err(ScoutError::model_api_error(format!("{}: {}", status, body)));
        }

        let body: GenerateContentResponse = response.json().await?;
        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ScoutError::malformed_response("response contained no candidates"))?;

        if let Some(reason) = candidate.finish_reason.as_deref() {
            debug!("Model finish reason: {}", reason);
        }

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        parse_report(&text)
    }
}

/// Parses model text into a report, tolerating Markdown code fences and a bare array.
pub fn parse_report(text: &str) -> Result<ScoutReport> {
    let clean = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    if clean.is_empty() {
        return Err(ScoutError::malformed_response("empty response text"));
    }

    match serde_json::from_str::<ScoutReport>(clean) {
        Ok(report) => Ok(report),
        Err(report_err) => match serde_json::from_str::<Vec<Catalyst>>(clean) {
            Ok(catalysts) => Ok(ScoutReport::new(catalysts)),
            Err(_) => Err(ScoutError::malformed_response(format!(
                "{} in {}",
                report_err, clean
            ))),
        },
    }
}
