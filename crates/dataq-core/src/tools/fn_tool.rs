use super::tool::{Tool, ToolArgs, ToolError};
use async_trait::async_trait;
use serde_json::{json, Value};

type Handler = dyn Fn(ToolArgs) -> Result<Value, ToolError> + Send + Sync;

/// A tool backed by a plain closure.
///
/// ```
/// use dataq_core::{FnTool, ToolError};
/// use serde_json::json;
///
/// let tool = FnTool::new("ping", "Answer with pong", |args| {
///     args.expect_none()?;
///     Ok::<_, ToolError>(json!("pong"))
/// });
/// ```
pub struct FnTool {
    name: String,
    description: String,
    parameters: Value,
    handler: Box<Handler>,
}

impl FnTool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ToolArgs) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: json!({ "type": "object", "properties": {} }),
            handler: Box::new(handler),
        }
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn parameters(&self) -> Value {
        self.parameters.clone()
    }
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        (self.handler)(args)
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
