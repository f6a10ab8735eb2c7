use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InputMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: Vec<InputMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub output_text: Option<String>,
}

impl ResponsesResponse {
    /// Joins every `output_text` part of every assistant message.
    pub fn output_text(&self) -> String {
        if let Some(text) = &self.output_text {
            return text.clone();
        }
        self.output
            .iter()
            .filter(|item| item.kind == "message")
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

/// Client for the hosted `/responses` endpoint.
#[derive(Clone)]
pub struct LLMClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LLMClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub fn from_config(api_key: String, config: &Config) -> Self {
        Self::new(
            api_key,
            config.base_url().to_string(),
            config.model().to_string(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn responses_url(&self) -> String {
        format!("{}/responses", self.base_url)
    }

    pub async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let url = self.responses_url();
        let request = build_request(&self.model, system, prompt, &today());

        debug!(url = %url, model = %self.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context(format!("Failed to reach {}", url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            warn!(status = %status, "Completion request failed");
            return Err(anyhow::anyhow!(
                "Request failed with status {}: {}",
                status,
                api_error_message(&body)
            ));
        }

        let parsed: ResponsesResponse =
            serde_json::from_str(&body).context("Failed to parse completion response")?;
        let text = parsed.output_text();
        if text.trim().is_empty() {
            return Err(anyhow::anyhow!("The model returned an empty response"));
        }

        debug!(chars = text.len(), "Completion received");
        Ok(text)
    }
}

/// Local date in the form "19 October 2026".
pub fn today() -> String {
    chrono::Local::now().format("%d %B %Y").to_string()
}

pub fn build_request(model: &str, system: &str, prompt: &str, today: &str) -> ResponsesRequest {
    ResponsesRequest {
        model: model.to_string(),
        input: vec![
            InputMessage {
                role: "system".to_string(),
                content: format!("{}\nToday's date is {}.", system, today),
            },
            InputMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            },
        ],
    }
}

/// Pulls `error.message` out of an API error body, falling back to the raw text.
pub fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "No error message".to_string()
            } else {
                body.trim().to_string()
            }
        })
}

pub fn error_text(err: &anyhow::Error) -> String {
    format!("❌ Error: {:#}", err)
}
