pub mod tool_choice;

pub use tool_choice::{ToolChoicePrompt, DATA_ASSISTANT_PREAMBLE, RESPONSE_INSTRUCTION};
