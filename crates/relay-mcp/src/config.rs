use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::McpError;

const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

/// Launch parameters for one tool server. Immutable once constructed.
#[derive(Clone)]
pub struct ServerConfig {
    pub id: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted: HashMap<&str, &str> = self
            .env
            .keys()
            .map(|k| (k.as_str(), "[REDACTED]"))
            .collect();
        f.debug_struct("ServerConfig")
            .field("id", &self.id)
            .field("command", &self.command)
            .field("args", &self.args)
            .field("env", &redacted)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Per-server record as declared by consumers: `{command, args, env?}`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServerDefinition {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TOOL_TIMEOUT_SECS
}

/// The persisted configuration shape: a mapping keyed `mcpServers`.
///
/// A `BTreeMap` keeps server iteration order deterministic regardless of the
/// declaration order in the source document.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServersDocument {
    #[serde(rename = "mcpServers")]
    pub mcp_servers: BTreeMap<String, ServerDefinition>,
}

impl ServersDocument {
    /// Parse from an in-memory JSON value.
    ///
    /// # Errors
    ///
    /// Returns `McpError::Config` if the value does not match the
    /// `mcpServers` shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, McpError> {
        serde_json::from_value(value).map_err(|e| McpError::Config(e.to_string()))
    }

    /// Parse from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `McpError::Config` on malformed JSON or a missing
    /// `mcpServers` key.
    pub fn from_json(raw: &str) -> Result<Self, McpError> {
        serde_json::from_str(raw).map_err(|e| McpError::Config(e.to_string()))
    }

    /// Read and parse a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `McpError::Config` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, McpError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| McpError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_json(&raw)
    }

    /// Flatten into `ServerConfig` entries, sorted by server id.
    #[must_use]
    pub fn into_configs(self) -> Vec<ServerConfig> {
        self.mcp_servers
            .into_iter()
            .map(|(id, def)| ServerConfig {
                id,
                command: def.command,
                args: def.args,
                env: def.env,
                timeout: Duration::from_secs(def.timeout),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        r#"{
            "mcpServers": {
                "playwright": {
                    "command": "npx",
                    "args": ["@playwright/mcp@latest"],
                    "env": {"DISPLAY": ":1"}
                },
                "airbnb": {
                    "command": "npx",
                    "args": ["-y", "@openbnb/mcp-server-airbnb", "--ignore-robots-txt"]
                }
            }
        }"#
    }

    #[test]
    fn parses_multi_server_document() {
        let doc = ServersDocument::from_json(sample()).unwrap();
        assert_eq!(doc.mcp_servers.len(), 2);
        assert_eq!(doc.mcp_servers["playwright"].env["DISPLAY"], ":1");
        assert!(doc.mcp_servers["airbnb"].env.is_empty());
    }

    #[test]
    fn configs_sorted_by_id() {
        let configs = ServersDocument::from_json(sample()).unwrap().into_configs();
        let ids: Vec<&str> = configs.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["airbnb", "playwright"]);
    }

    #[test]
    fn timeout_defaults_to_thirty_seconds() {
        let configs = ServersDocument::from_json(sample()).unwrap().into_configs();
        assert_eq!(configs[0].timeout, Duration::from_secs(30));
    }

    #[test]
    fn explicit_timeout_preserved() {
        let raw = r#"{"mcpServers": {"slow": {"command": "srv", "timeout": 120}}}"#;
        let configs = ServersDocument::from_json(raw).unwrap().into_configs();
        assert_eq!(configs[0].timeout, Duration::from_secs(120));
    }

    #[test]
    fn from_value_accepts_constructed_mapping() {
        let value = serde_json::json!({
            "mcpServers": {
                "fs": {"command": "npx", "args": ["-y", "@modelcontextprotocol/server-filesystem", "~/Documents/"]}
            }
        });
        let doc = ServersDocument::from_value(value).unwrap();
        assert_eq!(doc.mcp_servers["fs"].args.len(), 3);
    }

    #[test]
    fn missing_mcp_servers_key_is_config_error() {
        let err = ServersDocument::from_json(r#"{"servers": {}}"#).unwrap_err();
        assert!(matches!(err, McpError::Config(_)));
    }

    #[test]
    fn missing_command_is_config_error() {
        let err = ServersDocument::from_json(r#"{"mcpServers": {"x": {"args": []}}}"#).unwrap_err();
        assert!(matches!(err, McpError::Config(_)));
    }

    #[test]
    fn debug_redacts_env_values() {
        let configs = ServersDocument::from_json(sample()).unwrap().into_configs();
        let playwright = configs.iter().find(|c| c.id == "playwright").unwrap();
        let debug = format!("{playwright:?}");
        assert!(debug.contains("DISPLAY"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(":1"));
    }

    #[test]
    fn from_file_reads_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("servers.json");
        std::fs::write(&path, sample()).unwrap();
        let doc = ServersDocument::from_file(&path).unwrap();
        assert_eq!(doc.mcp_servers.len(), 2);
    }

    #[test]
    fn from_file_missing_is_config_error() {
        let err = ServersDocument::from_file("/nonexistent/servers.json").unwrap_err();
        assert!(matches!(err, McpError::Config(_)));
    }
}
