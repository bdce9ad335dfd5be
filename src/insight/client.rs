//! Ollama client for natural-language insights.
//!
//! Sends the metrics digest as a single non-streaming chat request and
//! returns the model's text. The response is shown to the user verbatim.

use crate::insight::epoch::{EpochGuard, InsightOutcome};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the insight client.
#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub ollama_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "llama3.2:latest".to_string(),
            temperature: 0.3,
            timeout_seconds: 120,
        }
    }
}

/// Message in the chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

/// Client that turns a metrics digest into a written insight.
pub struct InsightClient {
    config: InsightConfig,
    http_client: reqwest::Client,
    epochs: Arc<EpochGuard>,
}

impl InsightClient {
    /// Create a new client.
    pub fn new(config: InsightConfig) -> Result<Self> {
        info!(
            "Initializing insight client with model {} at {}",
            config.model_name, config.ollama_url
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
            epochs: Arc::new(EpochGuard::new()),
        })
    }

    /// Shared epoch guard; begin a new epoch on it to invalidate in-flight requests.
    pub fn epochs(&self) -> Arc<EpochGuard> {
        Arc::clone(&self.epochs)
    }

    /// Request an insight for `digest`.
    ///
    /// Returns [`InsightOutcome::Stale`] if another request started before
    /// this one resolved.
    pub async fn request_insight(&self, digest: &str) -> Result<InsightOutcome> {
        let epoch = self.epochs.begin();
        debug!(epoch = epoch.value(), "requesting insight");
        self.epochs.resolve(epoch, self.send_prompt(digest)).await
    }

    /// Build the chat request for a digest.
    fn build_request(&self, digest: &str) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: INSIGHT_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("{}\n\n{}", INSIGHT_USER_PREFIX, digest),
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        }
    }

    /// Send the prompt and return the response text.
    async fn send_prompt(&self, digest: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.config.ollama_url.trim_end_matches('/'));
        let request = self.build_request(digest);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("Request timed out after {}s", self.config.timeout_seconds)
                } else if e.is_connect() {
                    anyhow::anyhow!(
                        "Cannot connect to Ollama at {}. Is Ollama running?",
                        self.config.ollama_url
                    )
                } else {
                    anyhow::anyhow!("Failed to send request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Ollama API error {}: {}", status, body));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(chat_response.message.content.trim().to_string())
    }
}

/// System prompt for the insight request.
const INSIGHT_SYSTEM_PROMPT: &str = r#"You are an analyst of open-source collaboration.
You receive pre-computed metrics about when and where contributors work.
Write a short assessment (at most three paragraphs) of how globally
distributed the collaboration is, where activity concentrates, and one or
two concrete observations about the leading contributors.
Only use the numbers provided. Do not invent data."#;

const INSIGHT_USER_PREFIX: &str = "Here are the metrics:";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_config_default() {
        let config = InsightConfig::default();
        assert_eq!(config.model_name, "llama3.2:latest");
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_build_request_embeds_digest() {
        let client = InsightClient::new(InsightConfig::default()).unwrap();
        let request = client.build_request("Total events: 3");

        assert!(!request.stream);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert!(request.messages[1].content.ends_with("Total events: 3"));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.2:latest");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_epoch_guard_is_shared() {
        let client = InsightClient::new(InsightConfig::default()).unwrap();
        let epochs = client.epochs();
        let epoch = epochs.begin();
        assert!(client.epochs.is_current(epoch));
    }
}
