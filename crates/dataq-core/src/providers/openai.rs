use super::provider::{LlmProvider, ProviderError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MAX_TOKENS: u32 = 200;

/// Any OpenAI-compatible `/chat/completions` endpoint (OpenAI, Ollama, vLLM...).
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout: Option<Duration>,
}

impl OpenAiProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.max_tokens,
        });

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("openai completion: {} ({} prompt chars)", url, prompt.len());

        let mut req = self.client.post(&url).json(&body);
        // Local servers often run without a key.
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }
        send_chat(req, self.timeout).await
    }
}

/// Send a chat-completions request and pull out the first choice's text.
/// Shared with the Azure provider, which speaks the same payload.
pub(crate) async fn send_chat(
    mut req: RequestBuilder,
    timeout: Option<Duration>,
) -> Result<String, ProviderError> {
    if let Some(timeout) = timeout {
        req = req.timeout(timeout);
    }
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let data: Value = resp.json().await?;
    chat_content(&data)
}

pub(crate) fn chat_content(data: &Value) -> Result<String, ProviderError> {
    data["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| {
            ProviderError::Malformed("missing choices[0].message.content".to_string())
        })
}
