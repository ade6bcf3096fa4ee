//! Conversation participants.
//!
//! An [`Agent`] pairs a model backend with an optional workbench. During
//! its turn the agent runs a private generate/invoke sub-loop: tool
//! exchanges accumulate in per-turn scratch that is fed back to the
//! backend and discarded when the turn produces its final text. Only
//! that final text reaches the shared transcript.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use colloquy_core::{
    BackendResponse, ConversationEvent, ModelBackend, ToolExchange, ToolName, ToolRouter,
    Transcript,
};

use crate::config::RunConfig;
use crate::error::AgentError;
use crate::events::EventEmitter;

/// A participant's engine: one backend, optionally one workbench.
#[derive(Clone)]
pub struct Agent {
    backend: Arc<dyn ModelBackend>,
    workbench: Option<Arc<dyn ToolRouter>>,
}

impl Agent {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend,
            workbench: None,
        }
    }

    /// Attach a workbench. Its catalogue is offered to the backend on
    /// every generation step.
    pub fn with_workbench(mut self, workbench: Arc<dyn ToolRouter>) -> Self {
        self.workbench = Some(workbench);
        self
    }

    /// Run one turn against the shared transcript view, returning the
    /// final text to append.
    #[instrument(skip_all)]
    pub(crate) async fn respond(
        &self,
        view: &Transcript,
        config: &RunConfig,
        cancel: &CancellationToken,
        emitter: &EventEmitter,
    ) -> Result<String, AgentError> {
        let catalogue: Vec<ToolName> = self
            .workbench
            .as_ref()
            .map(|workbench| workbench.tool_names())
            .unwrap_or_default();
        let mut scratch: Vec<ToolExchange> = Vec::new();

        loop {
            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AgentError::Cancelled),
                outcome = tokio::time::timeout(
                    config.invocation_timeout,
                    self.backend.generate(view, &scratch, &catalogue),
                ) => outcome.map_err(|_| AgentError::Timeout(config.invocation_timeout))??,
            };

            match step {
                BackendResponse::Final(text) => return Ok(text),
                BackendResponse::ToolCall(request) => {
                    let Some(workbench) = &self.workbench else {
                        return Err(AgentError::NoWorkbench(request.tool));
                    };
                    if scratch.len() >= config.max_tool_iterations {
                        return Err(AgentError::ToolIterationsExceeded {
                            limit: config.max_tool_iterations,
                        });
                    }
                    debug!(tool = %request.tool, iteration = scratch.len(), "tool exchange");
                    emitter
                        .emit(ConversationEvent::ToolInvoked {
                            request: request.clone(),
                        })
                        .await;
                    // Cooperative cancellation releases the caller; it
                    // does not kill the tool server.
                    let result = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(AgentError::Cancelled),
                        outcome = tokio::time::timeout(
                            config.invocation_timeout,
                            workbench.invoke(&request),
                        ) => outcome.map_err(|_| AgentError::Timeout(config.invocation_timeout))??,
                    };
                    emitter
                        .emit(ConversationEvent::ToolResolved {
                            result: result.clone(),
                        })
                        .await;
                    scratch.push(ToolExchange { request, result });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_core::TerminationCondition;
    use colloquy_testing::ScriptedBackend;

    fn config() -> RunConfig {
        RunConfig::new("task", TerminationCondition::MaxMessages(10))
    }

    #[tokio::test]
    async fn turn_without_tools_returns_final_text() {
        let agent = Agent::new(Arc::new(ScriptedBackend::new().then_say("hello")));
        let text = agent
            .respond(
                &Transcript::seeded("task"),
                &config(),
                &CancellationToken::new(),
                &EventEmitter::disabled(),
            )
            .await
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn tool_call_without_workbench_fails() {
        let agent = Agent::new(Arc::new(
            ScriptedBackend::new().then_call("echo", serde_json::json!({})),
        ));
        let err = agent
            .respond(
                &Transcript::seeded("task"),
                &config(),
                &CancellationToken::new(),
                &EventEmitter::disabled(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::NoWorkbench(_)));
    }

    #[tokio::test]
    async fn cancelled_token_aborts_the_turn() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let agent = Agent::new(Arc::new(ScriptedBackend::new().then_say("never")));
        let err = agent
            .respond(
                &Transcript::seeded("task"),
                &config(),
                &cancel,
                &EventEmitter::disabled(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Cancelled));
    }

    #[tokio::test]
    async fn backend_failure_propagates() {
        let agent = Agent::new(Arc::new(ScriptedBackend::new().then_fail("model offline")));
        let err = agent
            .respond(
                &Transcript::seeded("task"),
                &config(),
                &CancellationToken::new(),
                &EventEmitter::disabled(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Backend(_)));
    }
}
