use super::error::{AgentError, DispatchError, FormatError};
use crate::prompts::ToolChoicePrompt;
use crate::providers::LlmProvider;
use crate::tools::registry::ToolRegistry;
use crate::tools::tool::{json_kind, ToolArgs};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The structured answer the model is asked to give: which tool, which args.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub tool: String,
    /// Kept as raw JSON; it is only checked when the tool is invoked.
    pub args: Value,
}

impl Decision {
    pub fn parse(response: &str) -> Result<Self, FormatError> {
        let value: Value = serde_json::from_str(response.trim())?;
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => return Err(FormatError::NotAnObject(json_kind(&other))),
        };
        let tool = match obj.remove("tool") {
            Some(Value::String(name)) => name,
            Some(other) => return Err(FormatError::ToolNotString(json_kind(&other))),
            None => return Err(FormatError::MissingTool),
        };
        let args = obj
            .remove("args")
            .unwrap_or_else(|| Value::Object(Map::new()));
        Ok(Self { tool, args })
    }
}

/// Asks the model to pick one registered tool, then runs it.
///
/// One `ask` is one completion request followed by at most one tool call.
/// Nothing is retried and nothing carries over between calls.
///
/// ```no_run
/// use dataq_core::{FnTool, OpenAiProvider, ToolAgent, ToolError, ToolRegistry};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # async fn demo() -> Result<(), dataq_core::AgentError> {
/// let registry = ToolRegistry::new().with_tool(FnTool::new(
///     "describe",
///     "Show dataframe statistics",
///     |args| {
///         args.expect_none()?;
///         Ok::<_, ToolError>(json!({ "rows": 3 }))
///     },
/// ));
/// let provider = OpenAiProvider::new("https://api.openai.com/v1", "sk-...", "gpt-4o");
/// let agent = ToolAgent::new(Arc::new(provider), registry);
/// let answer = agent.ask("Show me the stats").await?;
/// # Ok(())
/// # }
/// ```
pub struct ToolAgent {
    provider: Arc<dyn LlmProvider>,
    registry: ToolRegistry,
}

impl ToolAgent {
    pub fn new(provider: Arc<dyn LlmProvider>, registry: ToolRegistry) -> Self {
        Self { provider, registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn prompt(&self, question: &str) -> String {
        ToolChoicePrompt::new(&self.registry.describe_all()).render(question)
    }

    pub async fn ask(&self, question: &str) -> Result<Value, AgentError> {
        let prompt = self.prompt(question);
        debug!(
            "tool agent: {} tools, prompt {} chars",
            self.registry.len(),
            prompt.len()
        );

        let response = self.provider.complete(&prompt).await?;
        debug!("tool agent: response {} chars", response.len());

        match self.dispatch(&response).await {
            Ok(value) => Ok(value),
            Err(source) => {
                warn!("could not use tool from response: {}", source);
                Err(AgentError::ToolUse { response, source })
            }
        }
    }

    async fn dispatch(&self, response: &str) -> Result<Value, DispatchError> {
        let Decision { tool, args } = Decision::parse(response)?;

        let Some(handle) = self.registry.lookup(&tool) else {
            return Err(DispatchError::UnknownTool { name: tool });
        };
        info!("tool agent: calling '{}'", tool);

        let args = match ToolArgs::try_from(args) {
            Ok(args) => args,
            Err(source) => return Err(DispatchError::Invocation { tool, source }),
        };
        handle
            .call(args)
            .await
            .map_err(|source| DispatchError::Invocation { tool, source })
    }
}

impl std::fmt::Debug for ToolAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolAgent")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;
    use crate::testing::ScriptedProvider;
    use crate::tools::{FnTool, ToolError};
    use serde::Deserialize;
    use serde_json::json;
    use std::error::Error as _;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct ScatterParams {
        x: String,
        y: String,
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .with_tool(FnTool::new("describe", "Show dataframe statistics", |args| {
                args.expect_none()?;
                Ok::<_, ToolError>(json!({ "revenue": { "mean": 12.5, "count": 4 } }))
            }))
            .with_tool(FnTool::new("plot", "Plot revenue over time", |args| {
                let p: ScatterParams = args.parse()?;
                Ok::<_, ToolError>(json!(format!("scatter {} vs {}", p.y, p.x)))
            }))
            .with_tool(FnTool::new("fail", "Always fails", |_| {
                Err(ToolError::failed("database is down"))
            }))
    }

    fn agent(provider: &Arc<ScriptedProvider>) -> ToolAgent {
        ToolAgent::new(provider.clone(), registry())
    }

    #[tokio::test]
    async fn returns_the_tool_value_unchanged() {
        let provider = ScriptedProvider::replying(r#"{"tool": "describe", "args": {}}"#);
        let value = agent(&provider).ask("Show me the stats").await.unwrap();
        assert_eq!(value, json!({ "revenue": { "mean": 12.5, "count": 4 } }));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn sends_the_rendered_prompt() {
        let provider = ScriptedProvider::replying(r#"{"tool": "describe"}"#);
        let agent = agent(&provider);
        agent.ask("Show me the stats").await.unwrap();

        let sent = provider.prompts();
        assert_eq!(sent, vec![agent.prompt("Show me the stats")]);
        assert!(sent[0].contains("describe: Show dataframe statistics\nplot: Plot revenue over time\n"));
    }

    #[tokio::test]
    async fn missing_args_default_to_empty() {
        let provider = ScriptedProvider::replying(r#"{"tool": "describe"}"#);
        assert!(agent(&provider).ask("stats").await.is_ok());
    }

    #[tokio::test]
    async fn named_args_reach_the_tool() {
        let provider =
            ScriptedProvider::replying(r#"{"tool": "plot", "args": {"x": "date", "y": "revenue"}}"#);
        let value = agent(&provider).ask("plot it").await.unwrap();
        assert_eq!(value, json!("scatter revenue vs date"));
    }

    #[tokio::test]
    async fn non_json_is_a_tool_use_failure_with_raw_text() {
        let provider = ScriptedProvider::replying("I don't know");
        let err = agent(&provider).ask("stats").await.unwrap_err();

        assert_eq!(err.response(), Some("I don't know"));
        assert!(err.to_string().contains("I don't know"));
        assert!(matches!(
            err.dispatch_error(),
            Some(DispatchError::Format(FormatError::InvalidJson(_)))
        ));
        assert_eq!(provider.calls(), 1, "no retry on a bad response");
    }

    #[tokio::test]
    async fn unknown_tool_is_not_a_silent_no_op() {
        let provider = ScriptedProvider::replying(r#"{"tool": "nonexistent", "args": {}}"#);
        let err = agent(&provider).ask("stats").await.unwrap_err();

        match err.dispatch_error() {
            Some(DispatchError::UnknownTool { name }) => assert_eq!(name, "nonexistent"),
            other => panic!("expected unknown tool, got {other:?}"),
        }
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn bad_param_surfaces_invocation_error_as_cause() {
        let provider = ScriptedProvider::replying(r#"{"tool": "plot", "args": {"bad_param": 1}}"#);
        let err = agent(&provider).ask("plot").await.unwrap_err();

        let source = err.source().expect("tool-use failure chains its cause");
        let dispatch = source.downcast_ref::<DispatchError>().unwrap();
        let DispatchError::Invocation { tool, source } = dispatch else {
            panic!("expected invocation error, got {dispatch:?}");
        };
        assert_eq!(tool, "plot");
        assert!(matches!(source, ToolError::InvalidArguments(_)));
        assert!(source.to_string().contains("bad_param"));
    }

    #[tokio::test]
    async fn unexpected_arg_for_zero_param_tool() {
        let provider = ScriptedProvider::replying(r#"{"tool": "describe", "args": {"limit": 5}}"#);
        let err = agent(&provider).ask("stats").await.unwrap_err();
        assert!(matches!(
            err.dispatch_error(),
            Some(DispatchError::Invocation { .. })
        ));
    }

    #[tokio::test]
    async fn tool_failure_is_wrapped() {
        let provider = ScriptedProvider::replying(r#"{"tool": "fail"}"#);
        let err = agent(&provider).ask("anything").await.unwrap_err();
        let Some(DispatchError::Invocation { source, .. }) = err.dispatch_error() else {
            panic!("expected invocation error");
        };
        assert_eq!(source.to_string(), "database is down");
    }

    #[tokio::test]
    async fn non_object_args_fail_at_invocation() {
        for reply in [
            r#"{"tool": "describe", "args": [1, 2]}"#,
            r#"{"tool": "describe", "args": null}"#,
        ] {
            let provider = ScriptedProvider::replying(reply);
            let err = agent(&provider).ask("stats").await.unwrap_err();
            assert!(
                matches!(
                    err.dispatch_error(),
                    Some(DispatchError::Invocation { source: ToolError::InvalidArguments(_), .. })
                ),
                "{reply}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn unknown_tool_wins_over_bad_args() {
        let provider = ScriptedProvider::replying(r#"{"tool": "nope", "args": 7}"#);
        let err = agent(&provider).ask("q").await.unwrap_err();
        assert!(matches!(err.dispatch_error(), Some(DispatchError::UnknownTool { .. })));
    }

    #[tokio::test]
    async fn backend_error_is_not_wrapped() {
        let provider = ScriptedProvider::failing(|| ProviderError::Status {
            status: 503,
            body: "overloaded".to_string(),
        });
        let err = agent(&provider).ask("stats").await.unwrap_err();

        assert!(matches!(
            err,
            AgentError::Backend(ProviderError::Status { status: 503, .. })
        ));
        assert!(err.response().is_none());
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn decision_parse_classifies_format_errors() {
        assert!(matches!(Decision::parse("[1]"), Err(FormatError::NotAnObject("an array"))));
        assert!(matches!(Decision::parse("{}"), Err(FormatError::MissingTool)));
        assert!(matches!(
            Decision::parse(r#"{"tool": 3}"#),
            Err(FormatError::ToolNotString("a number"))
        ));
        assert!(matches!(Decision::parse(""), Err(FormatError::InvalidJson(_))));
    }

    #[test]
    fn decision_parse_tolerates_surrounding_whitespace() {
        let decision = Decision::parse("\n  {\"tool\": \"plot\", \"args\": {\"x\": 1}}  \n").unwrap();
        assert_eq!(decision.tool, "plot");
        assert_eq!(decision.args, json!({ "x": 1 }));
    }
}
