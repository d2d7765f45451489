#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] relay_llm::LlmError),

    #[error("no tool sessions available")]
    NoSessions,

    #[error("run cancelled")]
    Cancelled,
}
