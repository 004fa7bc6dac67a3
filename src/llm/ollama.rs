//! Ollama-backed narrator
//!
//! Sends one non-streaming `/api/generate` request per summary to a local
//! Ollama server.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{InsightNarrator, NarrationError, NarrationResult, StructuredSummary};
use crate::config::NarratorConfig;

/// Ollama generate request
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

/// Ollama generation options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama generate response
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    done: bool,
}

/// Narrator that phrases summaries with a local Ollama model
pub struct OllamaNarrator {
    client: Client,
    config: NarratorConfig,
}

impl OllamaNarrator {
    /// Create a narrator with its own HTTP client
    pub fn new(config: NarratorConfig) -> NarrationResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Check if Ollama answers at all
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.config.endpoint.trim_end_matches('/'));
        self.client
            .get(&url)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Build the prompt for a summary
    fn build_prompt(&self, summary: &StructuredSummary) -> NarrationResult<String> {
        let data = serde_json::to_string_pretty(summary)
            .map_err(|e| NarrationError::Malformed(format!("cannot encode summary: {e}")))?;

        let task = match summary {
            StructuredSummary::CategoryInsight { .. } => {
                r#"Write a two-sentence insight about this content category's performance and growth.
Also list up to 5 likely subcategories based on its hashtags.
Answer ONLY with JSON in this format:
{"insight": "...", "subcategories": ["...", "..."]}"#
            }
            StructuredSummary::Relations { .. } => {
                "Explain in at most three sentences which content categories are related and why, \
                 citing the shared hashtags. Answer in plain text."
            }
            StructuredSummary::Emerging { .. } => {
                "Summarize in at most three sentences which categories are emerging, how confident \
                 the signal is and what evidence supports it. Answer in plain text."
            }
        };

        Ok(format!(
            r#"You are an analyst of social media trends.

## Task:
{task}

## Rules:
1. Use only the numbers in the data below; do not invent figures
2. Be concise and neutral

## Data (JSON):
{data}

## Answer:"#
        ))
    }

    /// Generate text using Ollama
    async fn generate(&self, prompt: String) -> NarrationResult<String> {
        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));

        let request = OllamaRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = if status == StatusCode::TOO_MANY_REQUESTS {
                format!("quota exceeded: {body}")
            } else {
                format!("{status} - {}", body.chars().take(200).collect::<String>())
            };
            return Err(NarrationError::Unavailable(reason));
        }

        let parsed: OllamaResponse = response
            .json()
            .await
            .map_err(|e| NarrationError::Malformed(e.to_string()))?;

        if !parsed.done {
            tracing::debug!("Ollama reported an unfinished generation");
        }

        Ok(parsed.response)
    }

    fn classify(&self, err: reqwest::Error) -> NarrationError {
        if err.is_timeout() {
            NarrationError::Timeout(Duration::from_secs(self.config.timeout_secs))
        } else if err.is_connect() {
            NarrationError::Unavailable(format!("cannot reach {}: {err}", self.config.endpoint))
        } else {
            NarrationError::Http(err)
        }
    }
}

#[async_trait]
impl InsightNarrator for OllamaNarrator {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn narrate(&self, summary: &StructuredSummary) -> NarrationResult<String> {
        let prompt = self.build_prompt(summary)?;
        tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "Requesting narration");
        self.generate(prompt).await
    }
}
