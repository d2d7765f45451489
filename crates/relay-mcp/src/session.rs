use std::borrow::Cow;
use std::time::Duration;

use rmcp::ServiceExt;
use rmcp::model::{CallToolRequestParams, CallToolResult};
use rmcp::service::RunningService;
use rmcp::transport::TokioChildProcess;
use tokio::process::Command;
use tokio::sync::OnceCell;

use crate::config::ServerConfig;
use crate::error::McpError;
use crate::tool::ToolDescriptor;

type ClientService = RunningService<rmcp::RoleClient, ()>;

/// Live connection to one tool server process.
///
/// Owned exclusively by the `SessionManager`; lifecycle state is never
/// mutated from outside it.
pub struct Session {
    server_id: String,
    service: ClientService,
    timeout: Duration,
    tools: OnceCell<Vec<ToolDescriptor>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("server_id", &self.server_id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Spawn the server process and perform the MCP handshake.
    ///
    /// # Errors
    ///
    /// Returns `McpError::Launch` if the process cannot be spawned and
    /// `McpError::Handshake` if protocol negotiation fails.
    pub async fn connect(config: &ServerConfig) -> Result<Self, McpError> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args);
        for (k, v) in &config.env {
            cmd.env(k, v);
        }

        let transport = TokioChildProcess::new(cmd).map_err(|e| McpError::Launch {
            server_id: config.id.clone(),
            message: e.to_string(),
        })?;

        let service = ()
            .serve(transport)
            .await
            .map_err(|e| McpError::Handshake {
                server_id: config.id.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            server_id: config.id.clone(),
            service,
            timeout: config.timeout,
            tools: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    /// Discovered tool descriptors for this session.
    ///
    /// Discovery runs once per session; repeat calls return the cached set,
    /// so this is safe to call as often as the catalog needs it.
    ///
    /// # Errors
    ///
    /// Returns `McpError::ToolCall` if the initial tools/list request fails.
    pub async fn list_tools(&self) -> Result<&[ToolDescriptor], McpError> {
        let tools = self
            .tools
            .get_or_try_init(|| self.discover_tools())
            .await?;
        Ok(tools)
    }

    async fn discover_tools(&self) -> Result<Vec<ToolDescriptor>, McpError> {
        let tools = self
            .service
            .list_all_tools()
            .await
            .map_err(|e| McpError::ToolCall {
                server_id: self.server_id.clone(),
                tool_name: "tools/list".into(),
                message: e.to_string(),
            })?;

        Ok(tools
            .into_iter()
            .map(|t| ToolDescriptor {
                server_id: self.server_id.clone(),
                name: t.name.to_string(),
                description: t.description.map_or_else(String::new, |d| d.to_string()),
                input_schema: serde_json::to_value(&*t.input_schema).unwrap_or_default(),
            })
            .collect())
    }

    /// Invoke one tool with JSON arguments, bounded by the server's timeout.
    ///
    /// # Errors
    ///
    /// Returns `McpError::Timeout` on expiry or `McpError::ToolCall` if the
    /// request fails.
    pub async fn call_tool(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<CallToolResult, McpError> {
        let arguments: Option<serde_json::Map<String, serde_json::Value>> = args
            .as_object()
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect());

        let params = CallToolRequestParams {
            name: Cow::Owned(name.to_owned()),
            arguments,
            task: None,
            meta: None,
        };

        let result = tokio::time::timeout(self.timeout, self.service.call_tool(params))
            .await
            .map_err(|_| McpError::Timeout {
                server_id: self.server_id.clone(),
                tool_name: name.into(),
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| McpError::ToolCall {
                server_id: self.server_id.clone(),
                tool_name: name.into(),
                message: e.to_string(),
            })?;

        Ok(result)
    }

    /// Cancel the underlying service, reaping the child process.
    pub async fn shutdown(self) {
        if let Err(e) = self.service.cancel().await {
            tracing::debug!(server_id = self.server_id, "session cancel error: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn connect_nonexistent_command_is_launch_error() {
        let config = ServerConfig {
            id: "ghost".into(),
            command: "definitely-not-a-real-command-0b9f".into(),
            args: vec![],
            env: HashMap::new(),
            timeout: Duration::from_secs(5),
        };
        let err = Session::connect(&config).await.unwrap_err();
        assert!(matches!(err, McpError::Launch { server_id, .. } if server_id == "ghost"));
    }
}
