//! Failure taxonomy for the agents.

use crate::providers::ProviderError;
use crate::tools::ToolError;

/// What can be wrong with the text the model sent back.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("response has no \"tool\" field")]
    MissingTool,

    #[error("\"tool\" must be a string, got {0}")]
    ToolNotString(&'static str),
}

/// Why a well-delivered response could not be acted on.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("unknown tool '{name}'")]
    UnknownTool { name: String },

    #[error("tool '{tool}' failed")]
    Invocation {
        tool: String,
        #[source]
        source: ToolError,
    },
}

/// Errors surfaced by [`ToolAgent::ask`](super::ToolAgent::ask).
///
/// Backend failures pass through untouched. Everything that goes wrong after a
/// completion arrives is reported as [`AgentError::ToolUse`], which keeps the
/// raw response and chains the underlying [`DispatchError`] as its source.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Backend(#[from] ProviderError),

    #[error("could not use tool from response: {response}")]
    ToolUse {
        response: String,
        #[source]
        source: DispatchError,
    },
}

impl AgentError {
    /// The raw model response, for tool-use failures.
    pub fn response(&self) -> Option<&str> {
        match self {
            Self::ToolUse { response, .. } => Some(response),
            Self::Backend(_) => None,
        }
    }

    pub fn dispatch_error(&self) -> Option<&DispatchError> {
        match self {
            Self::ToolUse { source, .. } => Some(source),
            Self::Backend(_) => None,
        }
    }
}
