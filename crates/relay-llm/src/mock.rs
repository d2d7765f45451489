//! Test-only scripted model provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::provider::{Message, ModelAction, ModelProvider, ToolDefinition};

#[derive(Debug, Clone)]
pub struct MockModel {
    actions: Arc<Mutex<Vec<ModelAction>>>,
    calls: Arc<AtomicUsize>,
    pub default_action: ModelAction,
    pub fail_generate: bool,
    /// Milliseconds to sleep before returning an action.
    pub delay_ms: u64,
}

impl Default for MockModel {
    fn default() -> Self {
        Self {
            actions: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            default_action: ModelAction::FinalAnswer("mock answer".into()),
            fail_generate: false,
            delay_ms: 0,
        }
    }
}

impl MockModel {
    #[must_use]
    pub fn with_actions(actions: Vec<ModelAction>) -> Self {
        Self {
            actions: Arc::new(Mutex::new(actions)),
            ..Self::default()
        }
    }

    /// Action returned once the script (if any) is exhausted.
    #[must_use]
    pub fn with_default_action(mut self, action: ModelAction) -> Self {
        self.default_action = action;
        self
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_generate: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Number of `generate` calls observed so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ModelProvider for MockModel {
    async fn generate(
        &self,
        _history: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<ModelAction, crate::LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        if self.fail_generate {
            return Err(crate::LlmError::Other("mock model error".into()));
        }
        let mut actions = self.actions.lock().unwrap();
        if actions.is_empty() {
            Ok(self.default_action.clone())
        } else {
            Ok(actions.remove(0))
        }
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ToolCallRequest;

    #[tokio::test]
    async fn scripted_actions_in_order() {
        let model = MockModel::with_actions(vec![
            ModelAction::ToolCalls(vec![ToolCallRequest {
                name: "a".into(),
                arguments: serde_json::json!({}),
            }]),
            ModelAction::FinalAnswer("done".into()),
        ]);

        let first = model.generate(&[], &[]).await.unwrap();
        assert!(matches!(first, ModelAction::ToolCalls(_)));
        let second = model.generate(&[], &[]).await.unwrap();
        assert!(matches!(second, ModelAction::FinalAnswer(a) if a == "done"));
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn exhausted_script_falls_back_to_default() {
        let model = MockModel::with_actions(vec![]);
        let action = model.generate(&[], &[]).await.unwrap();
        assert!(matches!(action, ModelAction::FinalAnswer(a) if a == "mock answer"));
    }

    #[tokio::test]
    async fn failing_model_errors() {
        let model = MockModel::failing();
        assert!(model.generate(&[], &[]).await.is_err());
        assert_eq!(model.call_count(), 1);
    }
}
