pub mod agent;
pub mod error;
pub mod reasoning;

pub use agent::{Decision, ToolAgent};
pub use error::{AgentError, DispatchError, FormatError};
pub use reasoning::ReasoningAgent;
