use super::openai::{send_chat, DEFAULT_MAX_TOKENS};
use super::provider::{LlmProvider, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_DEPLOYMENT: &str = "o3-mini";
pub const DEFAULT_API_VERSION: &str = "2023-07-01-preview";

/// An Azure OpenAI chat deployment.
///
/// The deployment name takes the place of the model; auth is the `api-key`
/// header rather than a bearer token.
pub struct AzureOpenAiProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
    max_tokens: u32,
    timeout: Option<Duration>,
}

impl AzureOpenAiProvider {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: None,
        }
    }

    pub fn with_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = deployment.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint.trim_end_matches('/'),
            self.deployment
        )
    }
}

#[async_trait]
impl LlmProvider for AzureOpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.max_tokens,
        });

        let url = self.url();
        debug!(
            "azure completion: deployment={} ({} prompt chars)",
            self.deployment,
            prompt.len()
        );

        let req = self
            .client
            .post(&url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&body);
        send_chat(req, self.timeout).await
    }
}
