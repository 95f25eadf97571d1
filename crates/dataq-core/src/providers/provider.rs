use async_trait::async_trait;

/// Anything that turns a prompt into a completion.
///
/// This is the only thing the agents know about a model backend. Timeouts,
/// auth and transport details live in the implementation.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed completion payload: {0}")]
    Malformed(String),
}
