/// Opening line of every tool-choice prompt.
pub const DATA_ASSISTANT_PREAMBLE: &str = "You are a data assistant. Available tools:";

/// Closing line describing the only response shape the agent accepts.
pub const RESPONSE_INSTRUCTION: &str = "Respond with a single JSON object with exactly two fields, \
\"tool\" (string) and \"args\" (object of named arguments): {\"tool\": \"name\", \"args\": {...}}";

/// Renders the prompt that asks the model to pick one tool.
///
/// The output depends only on the tool list and the question, so the same
/// registry and question always produce the same bytes.
pub struct ToolChoicePrompt<'a> {
    tools: &'a [(String, String)],
}

impl<'a> ToolChoicePrompt<'a> {
    pub fn new(tools: &'a [(String, String)]) -> Self {
        Self { tools }
    }

    pub fn render(&self, question: &str) -> String {
        let mut lines = Vec::with_capacity(self.tools.len() + 3);
        lines.push(DATA_ASSISTANT_PREAMBLE.to_string());
        lines.extend(
            self.tools
                .iter()
                .map(|(name, description)| format!("{}: {}", name, description)),
        );
        lines.push(format!("Question: {}", question));
        lines.push(RESPONSE_INSTRUCTION.to_string());
        lines.join("\n")
    }
}
