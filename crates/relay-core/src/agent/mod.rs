//! Plan-act-observe loop bounded by a step budget.
//!
//! One step is one model-generation call. Tool failures of any kind are
//! folded back into the conversation as observations; only model-provider
//! errors, cancellation, and an empty catalog are fatal.

mod error;
mod turn;

use std::sync::Arc;

use relay_llm::{Message, ModelAction, ModelProvider, Role, ToolCallRequest, ToolDefinition};
use relay_mcp::{ToolCatalog, ToolRouter};
use tokio_util::sync::CancellationToken;

pub use error::AgentError;
pub use turn::{AgentTurn, LoopState, Observation, RunOutcome, TurnAction};

pub struct Agent<P, R> {
    provider: P,
    router: Arc<R>,
    catalog: ToolCatalog,
    preamble: Option<String>,
    cancel_token: CancellationToken,
}

impl<P, R> std::fmt::Debug for Agent<P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("tool_count", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl<P: ModelProvider, R: ToolRouter> Agent<P, R> {
    #[must_use]
    pub fn new(provider: P, router: Arc<R>, catalog: ToolCatalog) -> Self {
        Self {
            provider,
            router,
            catalog,
            preamble: None,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Replace the default system-prompt preamble.
    #[must_use]
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    /// Token callers can use to cancel an in-flight run.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Run a task to completion and return the final answer.
    ///
    /// Exhausting the step budget is not an error: the returned text carries
    /// a truncation notice instead. Use [`Agent::run_detailed`] to inspect
    /// the trace.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::NoSessions` when no tools are available,
    /// `AgentError::Cancelled` on cancellation, or the model provider error.
    pub async fn run(&self, task: &str, max_steps: usize) -> Result<String, AgentError> {
        Ok(self.run_detailed(task, max_steps).await?.answer)
    }

    /// Run a task and return the full outcome, including the turn trace.
    ///
    /// Issues at most `max_steps` model-generation calls.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Agent::run`].
    pub async fn run_detailed(&self, task: &str, max_steps: usize) -> Result<RunOutcome, AgentError> {
        if self.catalog.is_empty() {
            return Err(AgentError::NoSessions);
        }

        let definitions: Vec<ToolDefinition> = self
            .catalog
            .entries()
            .map(|(exposed_name, tool)| ToolDefinition {
                name: exposed_name,
                description: tool.description.clone(),
                input_schema: tool.input_schema.clone(),
            })
            .collect();

        let mut history = vec![
            Message::new(
                Role::System,
                crate::prompt::system_prompt(&self.catalog, self.preamble.as_deref()),
            ),
            Message::new(Role::User, task),
        ];

        let mut turns: Vec<AgentTurn> = Vec::new();
        let mut state = LoopState::Planning;

        for step in 0..max_steps {
            tracing::debug!(step, ?state, "agent turn");

            let action = tokio::select! {
                action = self.provider.generate(&history, &definitions) => action?,
                () = self.cancel_token.cancelled() => {
                    tracing::info!(step, "run cancelled while planning");
                    return Err(AgentError::Cancelled);
                }
            };

            match action {
                ModelAction::FinalAnswer(answer) => {
                    state = LoopState::Done;
                    tracing::info!(step, ?state, "model produced final answer");
                    turns.push(AgentTurn {
                        step,
                        action: TurnAction::FinalAnswer(answer.clone()),
                        observations: Vec::new(),
                    });
                    return Ok(RunOutcome {
                        answer,
                        truncated: false,
                        turns,
                    });
                }
                ModelAction::ToolCalls(calls) => {
                    state = LoopState::Acting;
                    tracing::debug!(step, ?state, calls = calls.len(), "dispatching tool calls");

                    let observations = tokio::select! {
                        obs = self.dispatch(&calls) => obs,
                        () = self.cancel_token.cancelled() => {
                            tracing::info!(step, "run cancelled while acting");
                            return Err(AgentError::Cancelled);
                        }
                    };

                    state = LoopState::Observing;
                    tracing::debug!(step, ?state, observations = observations.len(), "folding observations");
                    history.push(Message::new(Role::Assistant, render_intent(&calls)));
                    for obs in &observations {
                        if obs.is_error {
                            tracing::debug!(step, tool = obs.tool, "tool call failed: {}", obs.content);
                        }
                        history.push(Message::new(Role::User, render_observation(obs)));
                    }

                    turns.push(AgentTurn {
                        step,
                        action: TurnAction::ToolCalls(calls),
                        observations,
                    });
                    state = LoopState::Planning;
                }
            }
        }

        tracing::warn!(max_steps, "step budget exhausted, returning truncated answer");
        Ok(RunOutcome {
            answer: truncated_answer(&turns, max_steps),
            truncated: true,
            turns,
        })
    }

    /// Dispatch one action's tool calls concurrently; observations come back
    /// in request order regardless of completion order.
    async fn dispatch(&self, calls: &[ToolCallRequest]) -> Vec<Observation> {
        let futures = calls.iter().map(|call| async move {
            match self.catalog.resolve(&call.name) {
                Ok(tool) => {
                    let result = self
                        .router
                        .call(&tool.server_id, &tool.name, call.arguments.clone())
                        .await;
                    match result {
                        Ok(outcome) => Observation {
                            tool: call.name.clone(),
                            content: outcome.content,
                            is_error: outcome.is_error,
                        },
                        Err(e) => Observation {
                            tool: call.name.clone(),
                            content: e.to_string(),
                            is_error: true,
                        },
                    }
                }
                Err(e) => Observation {
                    tool: call.name.clone(),
                    content: e.to_string(),
                    is_error: true,
                },
            }
        });
        futures::future::join_all(futures).await
    }
}

fn render_intent(calls: &[ToolCallRequest]) -> String {
    serde_json::json!({ "tool_calls": calls }).to_string()
}

fn render_observation(obs: &Observation) -> String {
    if obs.is_error {
        format!("[{} error]\n{}", obs.tool, obs.content)
    } else {
        format!("[{}]\n{}", obs.tool, obs.content)
    }
}

/// Best partial answer once the budget is gone: the most recent successful
/// observation, behind a visible truncation notice.
fn truncated_answer(turns: &[AgentTurn], max_steps: usize) -> String {
    let partial = turns
        .iter()
        .rev()
        .flat_map(|t| t.observations.iter().rev())
        .find(|o| !o.is_error)
        .map(|o| o.content.as_str())
        .unwrap_or_default();

    if partial.is_empty() {
        format!("[truncated after {max_steps} steps]")
    } else {
        format!("[truncated after {max_steps} steps] {partial}")
    }
}
