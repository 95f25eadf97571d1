//! Let a language model pick one local tool to answer a question.
//!
//! [`ToolAgent`] renders a prompt listing the tools in a [`ToolRegistry`],
//! asks an [`LlmProvider`] for a `{"tool": ..., "args": {...}}` decision, and
//! runs the chosen tool. [`ReasoningAgent`] is the plain question-in,
//! text-out variant.

pub mod agents;
pub mod config;
pub mod data;
pub mod prompts;
pub mod providers;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

pub use agents::{AgentError, Decision, DispatchError, FormatError, ReasoningAgent, ToolAgent};
pub use config::{BackendKind, ConfigError, Credentials, DataqConfig, ProviderOptions};
pub use data::{data_tools, DataError, Dataset};
pub use providers::{AnthropicProvider, AzureOpenAiProvider, LlmProvider, OpenAiProvider, ProviderError};
pub use tools::{FnTool, Tool, ToolArgs, ToolDef, ToolError, ToolRegistry};
