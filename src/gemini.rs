//! Gemini generateContent client.
//!
//! One prompt in, one block of text out. No retries, no streaming; a
//! failed call is reported to the caller and that is the end of it.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Base endpoint for the generateContent API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// A capability that turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// HTTP client for the Gemini REST API.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        // The key rides in the query string, so the URL never goes to the log
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        debug!(model = %self.model, prompt_len = prompt.len(), "generate_request");

        let response = self
            .client
            .post(&url)
            .json(&request_body(prompt))
            .send()
            .await
            .context("Gemini API request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(describe_api_error(status, &body)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("failed to parse Gemini response")?;

        let text =
            extract_text(parsed).ok_or_else(|| anyhow!("Gemini response contained no text"))?;
        debug!(model = %self.model, response_len = text.len(), "generate_response");
        Ok(text)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn request_body(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        }],
    }
}

/// Pulls the first text part of the first candidate out of a response.
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|part| part.text)
}

/// Renders an HTTP error into a message, preferring the API's own error
/// body when it parses as the standard `{"error": {...}}` wrapper.
fn describe_api_error(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(wrapper) = serde_json::from_str::<ErrorWrapper>(body) {
        let message = wrapper
            .error
            .message
            .unwrap_or_else(|| "unknown error".to_string());
        match wrapper.error.status {
            Some(api_status) => {
                format!("Gemini API error {} ({}): {}", status.as_u16(), api_status, message)
            }
            None => format!("Gemini API error {}: {}", status.as_u16(), message),
        }
    } else {
        let excerpt: String = body.chars().take(200).collect();
        format!("Gemini API error {}: {}", status.as_u16(), excerpt.trim())
    }
}
