#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("failed to launch server '{server_id}': {message}")]
    Launch { server_id: String, message: String },

    #[error("handshake failed for server '{server_id}': {message}")]
    Handshake { server_id: String, message: String },

    #[error("tool call failed: {server_id}/{tool_name}: {message}")]
    ToolCall {
        server_id: String,
        tool_name: String,
        message: String,
    },

    #[error("tool call timed out after {timeout_secs}s: {server_id}/{tool_name}")]
    Timeout {
        server_id: String,
        tool_name: String,
        timeout_secs: u64,
    },

    #[error("server '{server_id}' not found")]
    ServerNotFound { server_id: String },

    #[error("server '{server_id}' is already connected")]
    ServerAlreadyConnected { server_id: String },

    #[error("unknown tool '{tool_name}'")]
    UnknownTool { tool_name: String },

    #[error("invalid server configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_error_display() {
        let err = McpError::Launch {
            server_id: "airbnb".into(),
            message: "no such file".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to launch server 'airbnb': no such file"
        );
    }

    #[test]
    fn handshake_error_display() {
        let err = McpError::Handshake {
            server_id: "playwright".into(),
            message: "connection closed".into(),
        };
        assert_eq!(
            err.to_string(),
            "handshake failed for server 'playwright': connection closed"
        );
    }

    #[test]
    fn tool_call_error_display() {
        let err = McpError::ToolCall {
            server_id: "fs".into(),
            tool_name: "read_file".into(),
            message: "not found".into(),
        };
        assert_eq!(err.to_string(), "tool call failed: fs/read_file: not found");
    }

    #[test]
    fn timeout_error_display() {
        let err = McpError::Timeout {
            server_id: "slow".into(),
            tool_name: "query".into(),
            timeout_secs: 30,
        };
        assert_eq!(err.to_string(), "tool call timed out after 30s: slow/query");
    }

    #[test]
    fn server_not_found_display() {
        let err = McpError::ServerNotFound {
            server_id: "missing".into(),
        };
        assert_eq!(err.to_string(), "server 'missing' not found");
    }

    #[test]
    fn unknown_tool_display() {
        let err = McpError::UnknownTool {
            tool_name: "teleport".into(),
        };
        assert_eq!(err.to_string(), "unknown tool 'teleport'");
    }
}
