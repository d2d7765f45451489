use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::RwLock;
use tokio::task::JoinSet;

use crate::config::ServerConfig;
use crate::error::McpError;
use crate::session::Session;
use crate::tool::{ToolDescriptor, ToolOutcome};

/// One server that failed to come up during `connect_all`.
#[derive(Debug)]
pub struct ConnectFailure {
    pub server_id: String,
    pub error: McpError,
}

/// Outcome of establishing the configured fleet.
///
/// Launch and handshake failures are non-fatal as long as at least one
/// session survives; the failures are carried here so callers can warn about
/// a degraded catalog instead of silently shrinking it.
#[derive(Debug, Default)]
pub struct ConnectReport {
    pub tools: Vec<ToolDescriptor>,
    pub failures: Vec<ConnectFailure>,
}

impl ConnectReport {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Dispatch seam between the agent loop and live sessions.
///
/// The loop never touches session lifecycle state; it routes every
/// invocation through this trait, which `SessionManager` implements.
pub trait ToolRouter: Send + Sync {
    /// Invoke `tool_name` on the session owning it.
    ///
    /// # Errors
    ///
    /// Returns `McpError` when the session is missing or the call fails.
    fn call(
        &self,
        server_id: &str,
        tool_name: &str,
        args: serde_json::Value,
    ) -> impl Future<Output = Result<ToolOutcome, McpError>> + Send;
}

/// Owns one `Session` per configured server.
pub struct SessionManager {
    configs: Vec<ServerConfig>,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    /// Ids with a connect in flight; claimed before spawning so two
    /// concurrent connects for the same id cannot both reach the insert.
    connecting: Arc<Mutex<HashSet<String>>>,
}

/// Claim on a server id held while its connect is in flight. Released on
/// drop, so a connect future dropped mid-handshake never wedges the id.
struct ConnectClaim {
    connecting: Arc<Mutex<HashSet<String>>>,
    server_id: String,
}

impl Drop for ConnectClaim {
    fn drop(&mut self) {
        self.connecting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.server_id);
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("server_count", &self.configs.len())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    #[must_use]
    pub fn new(configs: Vec<ServerConfig>) -> Self {
        Self {
            configs,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            connecting: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Claim `server_id` for an in-flight connect.
    ///
    /// Fails while a session for the id is live or another connect for it
    /// has not resolved yet.
    async fn claim(&self, server_id: &str) -> Result<ConnectClaim, McpError> {
        let sessions = self.sessions.read().await;
        let mut connecting = self
            .connecting
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if sessions.contains_key(server_id) || !connecting.insert(server_id.to_owned()) {
            return Err(McpError::ServerAlreadyConnected {
                server_id: server_id.into(),
            });
        }
        Ok(ConnectClaim {
            connecting: Arc::clone(&self.connecting),
            server_id: server_id.to_owned(),
        })
    }

    /// Connect to all configured servers concurrently and discover their
    /// tools. Servers that fail are skipped and recorded in the report.
    pub async fn connect_all(&self) -> ConnectReport {
        let mut join_set = JoinSet::new();

        for config in self.configs.clone() {
            join_set.spawn(async move {
                let result = Session::connect(&config).await;
                (config.id, result)
            });
        }

        let mut report = ConnectReport::default();
        let mut sessions = self.sessions.write().await;

        while let Some(result) = join_set.join_next().await {
            let Ok((server_id, connect_result)) = result else {
                tracing::warn!("session connect task panicked");
                continue;
            };

            match connect_result {
                Ok(session) if sessions.contains_key(&server_id) => {
                    tracing::warn!(server_id, "session already live, refusing to replace it");
                    session.shutdown().await;
                    let error = McpError::ServerAlreadyConnected {
                        server_id: server_id.clone(),
                    };
                    report.failures.push(ConnectFailure { server_id, error });
                }
                Ok(session) => match session.list_tools().await {
                    Ok(tools) => {
                        tracing::info!(server_id, tools = tools.len(), "connected to MCP server");
                        report.tools.extend(tools.iter().cloned());
                        sessions.insert(server_id, session);
                    }
                    Err(error) => {
                        tracing::warn!(server_id, "tool discovery failed: {error:#}");
                        session.shutdown().await;
                        report.failures.push(ConnectFailure { server_id, error });
                    }
                },
                Err(error) => {
                    tracing::warn!(server_id, "MCP server connection failed: {error:#}");
                    report.failures.push(ConnectFailure { server_id, error });
                }
            }
        }

        // Tool order follows config order, not task completion order
        report
            .tools
            .sort_by(|a, b| (&a.server_id, &a.name).cmp(&(&b.server_id, &b.name)));

        report
    }

    /// Connect a single configured server and return its discovered tools.
    ///
    /// # Errors
    ///
    /// Returns `ServerNotFound` for an unknown id, `ServerAlreadyConnected`
    /// for a live or currently-connecting one, or the
    /// launch/handshake/discovery error.
    pub async fn connect(&self, server_id: &str) -> Result<Vec<ToolDescriptor>, McpError> {
        let config = self
            .configs
            .iter()
            .find(|c| c.id == server_id)
            .ok_or_else(|| McpError::ServerNotFound {
                server_id: server_id.into(),
            })?;

        let _claim = self.claim(server_id).await?;

        let session = Session::connect(config).await?;
        let tools = match session.list_tools().await {
            Ok(tools) => tools.to_vec(),
            Err(e) => {
                session.shutdown().await;
                return Err(e);
            }
        };

        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(server_id) {
            // Lost the insert race; a live session is never replaced.
            drop(sessions);
            session.shutdown().await;
            return Err(McpError::ServerAlreadyConnected {
                server_id: server_id.into(),
            });
        }
        sessions.insert(server_id.to_owned(), session);
        Ok(tools)
    }

    /// Tear down one session, releasing its process.
    ///
    /// # Errors
    ///
    /// Returns `ServerNotFound` if no live session exists for the id.
    pub async fn disconnect(&self, server_id: &str) -> Result<(), McpError> {
        let session = {
            let mut sessions = self.sessions.write().await;
            sessions
                .remove(server_id)
                .ok_or_else(|| McpError::ServerNotFound {
                    server_id: server_id.into(),
                })?
        };
        tracing::info!(server_id, "disconnecting MCP server");
        session.shutdown().await;
        Ok(())
    }

    /// Cached tool descriptors for one live session.
    ///
    /// # Errors
    ///
    /// Returns `ServerNotFound` if the session is not live.
    pub async fn list_tools(&self, server_id: &str) -> Result<Vec<ToolDescriptor>, McpError> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(server_id)
            .ok_or_else(|| McpError::ServerNotFound {
                server_id: server_id.into(),
            })?;
        Ok(session.list_tools().await?.to_vec())
    }

    /// Route a tool call to the owning session.
    ///
    /// # Errors
    ///
    /// Returns `ServerNotFound` if the session is not live, or the
    /// invocation error.
    pub async fn call_tool(
        &self,
        server_id: &str,
        tool_name: &str,
        args: serde_json::Value,
    ) -> Result<ToolOutcome, McpError> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(server_id)
            .ok_or_else(|| McpError::ServerNotFound {
                server_id: server_id.into(),
            })?;
        let result = session.call_tool(tool_name, args).await?;
        Ok(ToolOutcome::from_call_result(&result))
    }

    /// Ids of live sessions, sorted.
    pub async fn active_servers(&self) -> Vec<String> {
        let sessions = self.sessions.read().await;
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn has_active_sessions(&self) -> bool {
        !self.sessions.read().await.is_empty()
    }

    /// Graceful teardown of every live session.
    pub async fn shutdown_all(&self) {
        let mut sessions = self.sessions.write().await;
        let drained: Vec<(String, Session)> = sessions.drain().collect();
        for (id, session) in drained {
            tracing::info!(server_id = id, "shutting down MCP session");
            session.shutdown().await;
        }
    }
}

impl ToolRouter for SessionManager {
    async fn call(
        &self,
        server_id: &str,
        tool_name: &str,
        args: serde_json::Value,
    ) -> Result<ToolOutcome, McpError> {
        self.call_tool(server_id, tool_name, args).await
    }
}
