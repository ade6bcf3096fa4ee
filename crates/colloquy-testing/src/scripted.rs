//! Scripted model backends.
//!
//! [`ScriptedBackend`] plays back a fixed sequence of generation steps
//! and records what it was asked, so orchestration tests can assert on
//! both the produced conversation and the inputs each step received.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use colloquy_core::{
    BackendError, BackendResponse, ModelBackend, ToolCallRequest, ToolExchange, ToolName,
    Transcript,
};

/// A snapshot of one `generate` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationCall {
    /// Number of transcript messages visible to the backend.
    pub transcript_len: usize,
    /// Number of tool exchanges in the turn's scratch so far.
    pub scratch_len: usize,
    /// The tool catalogue the backend was offered.
    pub catalogue: Vec<ToolName>,
}

/// Plays back a queue of scripted responses, one per `generate` call.
///
/// An exhausted script is a test bug and reported as a fatal backend
/// error.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<BackendResponse, BackendError>>>,
    calls: Mutex<Vec<GenerationCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a final-text step.
    pub fn then_say(self, text: impl Into<String>) -> Self {
        self.push(Ok(BackendResponse::Final(text.into())))
    }

    /// Queue a tool-call step.
    pub fn then_call(self, tool: &str, arguments: Value) -> Self {
        self.push(Ok(BackendResponse::ToolCall(ToolCallRequest::new(
            ToolName::new_unchecked(tool),
            arguments,
        ))))
    }

    /// Queue a backend failure.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Err(BackendError::fatal(message)))
    }

    fn push(self, step: Result<BackendResponse, BackendError>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(step);
        }
        self
    }

    /// How many times `generate` was called.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// Snapshots of every `generate` call, in order.
    pub fn calls(&self) -> Vec<GenerationCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn generate(
        &self,
        view: &Transcript,
        scratch: &[ToolExchange],
        catalogue: &[ToolName],
    ) -> Result<BackendResponse, BackendError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(GenerationCall {
                transcript_len: view.len(),
                scratch_len: scratch.len(),
                catalogue: catalogue.to_vec(),
            });
        }
        self.script
            .lock()
            .map_err(|_| BackendError::fatal("script mutex poisoned"))?
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::fatal("script exhausted")))
    }
}

/// Always answers with the same final text. Handy for cap-driven runs
/// where the content of each turn does not matter.
pub struct StaticBackend {
    text: String,
    calls: Mutex<usize>,
}

impl StaticBackend {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|count| *count).unwrap_or(0)
    }
}

#[async_trait]
impl ModelBackend for StaticBackend {
    async fn generate(
        &self,
        _view: &Transcript,
        _scratch: &[ToolExchange],
        _catalogue: &[ToolName],
    ) -> Result<BackendResponse, BackendError> {
        if let Ok(mut count) = self.calls.lock() {
            *count += 1;
        }
        Ok(BackendResponse::Final(self.text.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn plays_back_in_order_and_records_calls() {
        let backend = ScriptedBackend::new()
            .then_say("first")
            .then_call("echo", json!({"text": "x"}));

        let transcript = Transcript::seeded("task");
        let catalogue = vec![ToolName::new_unchecked("echo")];

        let step = backend.generate(&transcript, &[], &catalogue).await.unwrap();
        assert_eq!(step, BackendResponse::Final("first".into()));

        let step = backend.generate(&transcript, &[], &catalogue).await.unwrap();
        assert!(matches!(step, BackendResponse::ToolCall(_)));

        assert_eq!(backend.call_count(), 2);
        assert_eq!(backend.calls()[0].transcript_len, 1);
        assert_eq!(backend.calls()[1].catalogue, catalogue);
    }

    #[tokio::test]
    async fn exhausted_script_fails() {
        let backend = ScriptedBackend::new();
        let err = backend
            .generate(&Transcript::new(), &[], &[])
            .await
            .unwrap_err();
        assert!(err.message.contains("exhausted"));
    }

    #[tokio::test]
    async fn static_backend_repeats() {
        let backend = StaticBackend::new("ack");
        for _ in 0..3 {
            let step = backend.generate(&Transcript::new(), &[], &[]).await.unwrap();
            assert_eq!(step, BackendResponse::Final("ack".into()));
        }
        assert_eq!(backend.call_count(), 3);
    }
}
