use crate::completion::{CompletionBackend, CompletionRequest};
use crate::config::CompletionConfig;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Response structure from the chat completions API
#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// OpenAI chat completions client
///
/// Sends one request per call: no retries, no streaming.
pub struct OpenAIClient {
    client: Client,
    api_key: Option<String>,
    api_key_env: String,
    endpoint: String,
}

impl OpenAIClient {
    /// Create a new client
    ///
    /// # Arguments
    ///
    /// * `config` - Completion section of the gateway config
    /// * `api_key` - Credential; `None` makes every call fail with a descriptive error
    pub fn new(config: &CompletionConfig, api_key: Option<String>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            api_key_env: config.api_key_env.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
        })
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionBackend for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            GatewayError::Completion(format!(
                "No API key provided. Set the {} environment variable.",
                self.api_key_env
            ))
        })?;

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Completion(format!("Network error: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(GatewayError::Completion(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Completion(format!("Failed to parse response: {}", e)))?;

        log::debug!("Completion API call took {:?}", start.elapsed());

        let choice = result.choices.into_iter().next().ok_or_else(|| {
            GatewayError::Completion("Response contained no choices".to_string())
        })?;

        choice.message.content.ok_or_else(|| {
            GatewayError::Completion("First choice has no message content".to_string())
        })
    }
}
