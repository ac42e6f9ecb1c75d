use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::Classifier;
use crate::config::ProviderConfig;
use crate::error::ProviderError;

/// Classifier backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiClassifier {
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    client: Client,
}

impl OpenAiClassifier {
    /// Build a classifier. Fails when no credential is configured or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &ProviderConfig, timeout: Duration) -> anyhow::Result<Self> {
        let api_key = config
            .credential()
            .ok_or_else(|| anyhow::anyhow!("no provider credential configured"))?
            .to_string();
        if config.model.trim().is_empty() {
            anyhow::bail!("provider model name is empty");
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            timeout,
            client,
        })
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    fn name(&self) -> &str {
        &self.model
    }

    async fn classify(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = self.build_request(prompt);

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let content = extract_content(&text)?;
        debug!(model = %self.model, raw = %content, "provider raw output");
        Ok(content)
    }
}

impl OpenAiClassifier {
    fn map_transport(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// Pull the first choice's message text out of a chat completions body.
fn extract_content(body: &str) -> Result<String, ProviderError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("invalid completion body: {e}")))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    if content.is_empty() {
        return Err(ProviderError::Malformed("completion has no content".to_string()));
    }
    Ok(content)
}

// --- API types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
