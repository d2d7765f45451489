#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty response from {provider}")]
    EmptyResponse { provider: String },

    #[error("malformed action from {provider}: {detail}")]
    MalformedAction { provider: String, detail: String },

    #[error("provider unavailable")]
    Unavailable,

    #[error("{0}")]
    Other(String),
}
