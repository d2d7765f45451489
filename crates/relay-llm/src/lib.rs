//! Model provider abstraction for the relay agent loop.

pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod provider;

pub use error::LlmError;
#[cfg(feature = "mock")]
pub use mock::MockModel;
pub use provider::{Message, ModelAction, ModelProvider, Role, ToolCallRequest, ToolDefinition};
