use super::openai::DEFAULT_MAX_TOKENS;
use super::provider::{LlmProvider, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout: Option<Duration>,
}

impl AnthropicProvider {
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

/// Concatenate the text blocks of a Messages API response.
fn message_text(data: &Value) -> Result<String, ProviderError> {
    let blocks = data["content"]
        .as_array()
        .ok_or_else(|| ProviderError::Malformed("missing content array".to_string()))?;
    let text: String = blocks
        .iter()
        .filter(|b| b["type"] == "text")
        .filter_map(|b| b["text"].as_str())
        .collect();
    Ok(text.trim().to_string())
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        debug!("anthropic completion: {} ({} prompt chars)", url, prompt.len());

        let mut req = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body);
        if let Some(timeout) = self.timeout {
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
        message_text(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::serve_once;
    use hyper::StatusCode;

    #[test]
    fn message_text_joins_text_blocks_only() {
        let data = json!({
            "content": [
                { "type": "thinking", "thinking": "hmm" },
                { "type": "text", "text": "{\"tool\": " },
                { "type": "text", "text": "\"describe\"}\n" }
            ]
        });
        assert_eq!(message_text(&data).unwrap(), "{\"tool\": \"describe\"}");
    }

    #[test]
    fn message_text_requires_content() {
        assert!(matches!(
            message_text(&json!({ "type": "error" })),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn complete_sends_versioned_headers() {
        let (addr, captured) = serve_once(
            StatusCode::OK,
            r#"{"content":[{"type":"text","text":"hi"}]}"#,
        )
        .await;

        let provider = AnthropicProvider::new(format!("http://{addr}"), "ak", "claude-model");
        assert_eq!(provider.complete("hello").await.unwrap(), "hi");

        let req = captured.await.unwrap();
        assert_eq!(req.path_and_query, "/v1/messages");
        assert_eq!(req.headers["x-api-key"], "ak");
        assert_eq!(req.headers["anthropic-version"], "2023-06-01");
        assert_eq!(req.body["model"], "claude-model");
        assert_eq!(req.body["messages"][0]["content"], "hello");
    }
}
