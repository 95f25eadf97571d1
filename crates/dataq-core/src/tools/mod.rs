pub mod fn_tool;
pub mod registry;
pub mod tool;

pub use fn_tool::FnTool;
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolArgs, ToolDef, ToolError};
