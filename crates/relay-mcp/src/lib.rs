//! MCP session lifecycle, tool discovery, and multi-server routing.

pub mod catalog;
pub mod config;
pub mod error;
pub mod manager;
pub mod session;
pub mod tool;

pub use catalog::ToolCatalog;
pub use config::{ServerConfig, ServersDocument};
pub use error::McpError;
pub use manager::{ConnectFailure, ConnectReport, SessionManager, ToolRouter};
pub use session::Session;
pub use tool::{ToolDescriptor, ToolOutcome};
