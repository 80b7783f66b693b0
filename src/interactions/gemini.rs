//! Gemini Interaction Checker
//!
//! Asks the Gemini `generateContent` endpoint for a JSON interaction report.

use super::{InteractionChecker, InteractionError, InteractionReport};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Configuration for the Gemini checker
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key (GEMINI_API_KEY); requests fail fast without one
    pub api_key: Option<String>,
    /// Base URL (e.g., "https://generativelanguage.googleapis.com")
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum attempts per check
    pub max_retries: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
            request_timeout_ms: 30000,
            max_retries: 3,
        }
    }
}

/// Gemini-backed interaction checker
pub struct GeminiChecker {
    client: Client,
    config: GeminiConfig,
}

impl GeminiChecker {
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn has_api_key(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// POST the prompt with retry logic, returning the model's text
    async fn generate(&self, api_key: &str, prompt: String) -> Result<String, InteractionError> {
        let url = self.endpoint();
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let mut last_error = InteractionError::Unavailable;

        for attempt in 0..self.config.max_retries.max(1) {
            if attempt > 0 {
                tokio::time::sleep(retry_delay(attempt)).await;
            }

            let sent = self
                .client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&body)
                .send()
                .await;

            match sent {
                Ok(response) if response.status().is_success() => {
                    let parsed: GenerateResponse =
                        response.json().await.map_err(InteractionError::Request)?;
                    return parsed.first_text().ok_or_else(|| {
                        InteractionError::InvalidResponse("response had no candidates".to_string())
                    });
                }
                Ok(response) if response.status().as_u16() == 429 => {
                    tracing::warn!(attempt, "Gemini rate limited the interaction check");
                    last_error = InteractionError::RateLimited;
                }
                Ok(response) if response.status().is_server_error() => {
                    let status = response.status().as_u16();
                    tracing::warn!(attempt, status, "Gemini server error");
                    last_error = InteractionError::Api {
                        status,
                        message: response.text().await.unwrap_or_default(),
                    };
                }
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    return Err(InteractionError::Api {
                        status: status.as_u16(),
                        message: text,
                    });
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Gemini request failed");
                    last_error = if e.is_timeout() {
                        InteractionError::Timeout
                    } else if e.is_connect() {
                        InteractionError::Unavailable
                    } else {
                        InteractionError::Request(e)
                    };
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl InteractionChecker for GeminiChecker {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn check(&self, drugs: &[String]) -> Result<InteractionReport, InteractionError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(InteractionError::MissingApiKey),
        };

        let text = self.generate(api_key, build_prompt(drugs)).await?;
        parse_report(&text)
    }
}

/// Exponential backoff before retry `attempt`: 1s, 2s, 4s...
fn retry_delay(attempt: u32) -> std::time::Duration {
    std::time::Duration::from_secs(2u64.pow(attempt.saturating_sub(1).min(6)))
}

/// Prompt asking for a strict JSON interaction report
pub fn build_prompt(drugs: &[String]) -> String {
    let drug_list = serde_json::to_string(drugs).unwrap_or_else(|_| drugs.join(", "));
    format!(
        r#"You are an expert pharmacological assistant. Your task is to analyze a list of drugs
for potential drug-drug interactions.

Here is the list of medications:
{drug_list}

Please analyze this list for any clinically significant interactions between any
combination of the drugs.

Your response MUST be a JSON object only, with no other explanatory text.
The JSON object must follow this format:
{{
  "interactions": [
    {{
      "drugs": ["Drug Name A", "Drug Name B"],
      "severity": "high" | "moderate" | "low",
      "description": "A clear, one-sentence description of the interaction."
    }}
  ]
}}

If no clinically significant interactions are found, return an object with an
empty 'interactions' list:
{{
  "interactions": []
}}"#
    )
}

/// Parse the model's text, tolerating a Markdown code fence around the JSON
pub fn parse_report(text: &str) -> Result<InteractionReport, InteractionError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body).map_err(|e| InteractionError::InvalidResponse(e.to_string()))
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()
            .map(|p| p.text)
    }
}
