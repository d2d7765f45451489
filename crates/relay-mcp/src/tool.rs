use rmcp::model::{CallToolResult, RawContent};
use serde::{Deserialize, Serialize};

/// Metadata for one invocable capability advertised by a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub server_id: String,
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

impl ToolDescriptor {
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.server_id, self.name)
    }
}

/// Flattened result of one tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutcome {
    /// Collapse an rmcp result into text, joining text blocks and skipping
    /// non-text content.
    #[must_use]
    pub fn from_call_result(result: &CallToolResult) -> Self {
        let content = result
            .content
            .iter()
            .filter_map(|c| {
                if let RawContent::Text(t) = &c.raw {
                    Some(t.text.as_str())
                } else {
                    tracing::debug!("skipping non-text content from tool result");
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            content,
            is_error: result.is_error.unwrap_or(false),
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            is_error: true,
        }
    }
}
