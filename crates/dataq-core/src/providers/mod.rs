pub mod anthropic;
pub mod azure;
pub mod openai;
pub mod provider;

pub use anthropic::AnthropicProvider;
pub use azure::AzureOpenAiProvider;
pub use openai::OpenAiProvider;
pub use provider::{LlmProvider, ProviderError};

#[cfg(test)]
pub(crate) mod testing;
