use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Model-facing view of one invocable tool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// One tool invocation requested by the model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    #[serde(default = "empty_args")]
    pub arguments: serde_json::Value,
}

fn empty_args() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// What the model decided to do with one planning step.
///
/// A single action may carry several tool calls; the loop dispatches them
/// concurrently and folds the observations back in request order.
#[derive(Clone, Debug)]
pub enum ModelAction {
    ToolCalls(Vec<ToolCallRequest>),
    FinalAnswer(String),
}

pub trait ModelProvider: Send + Sync {
    /// Produce the next action given the conversation so far and the tools
    /// currently available.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to communicate or the response
    /// cannot be interpreted as an action.
    fn generate(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> impl Future<Output = Result<ModelAction, crate::LlmError>> + Send;

    fn name(&self) -> &str;
}
