//! Agent loop driving an LLM against a multi-server MCP tool catalog.

pub mod agent;
pub mod prompt;

pub use agent::{Agent, AgentError, AgentTurn, LoopState, Observation, RunOutcome, TurnAction};
