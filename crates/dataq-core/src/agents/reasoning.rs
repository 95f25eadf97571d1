use crate::providers::{LlmProvider, ProviderError};
use std::sync::Arc;
use tracing::debug;

/// Forwards the question to the backend as-is and returns the completion.
///
/// No tools, no parsing. Kept separate from [`ToolAgent`](super::ToolAgent)
/// so the plain path stays trivial.
pub struct ReasoningAgent {
    provider: Arc<dyn LlmProvider>,
}

impl ReasoningAgent {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub async fn ask(&self, question: &str) -> Result<String, ProviderError> {
        debug!("reasoning agent: {} chars", question.len());
        self.provider.complete(question).await
    }
}
