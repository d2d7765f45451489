use relay_llm::ToolCallRequest;

/// Current phase of the plan-act-observe cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Planning,
    Acting,
    Observing,
    Done,
}

/// What the model chose at the top of a turn.
#[derive(Debug, Clone)]
pub enum TurnAction {
    ToolCalls(Vec<ToolCallRequest>),
    FinalAnswer(String),
}

/// Result of one dispatched tool call, success or folded failure.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Name the tool was requested under.
    pub tool: String,
    pub content: String,
    pub is_error: bool,
}

/// One plan-act-observe iteration. Turns are append-only and bounded by the
/// step budget; a final-answer turn carries no observations.
#[derive(Debug, Clone)]
pub struct AgentTurn {
    pub step: usize,
    pub action: TurnAction,
    pub observations: Vec<Observation>,
}

/// Outcome of a whole run, including the turn trace.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub answer: String,
    /// True when the step budget ended the run instead of the model.
    pub truncated: bool,
    pub turns: Vec<AgentTurn>,
}

impl RunOutcome {
    /// Model-generation calls issued during the run.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.turns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_counts_turns() {
        let outcome = RunOutcome {
            answer: "done".into(),
            truncated: false,
            turns: vec![
                AgentTurn {
                    step: 0,
                    action: TurnAction::ToolCalls(vec![]),
                    observations: vec![],
                },
                AgentTurn {
                    step: 1,
                    action: TurnAction::FinalAnswer("done".into()),
                    observations: vec![],
                },
            ],
        };
        assert_eq!(outcome.steps(), 2);
    }
}
