//! Model backend abstraction.
//!
//! A [`ModelBackend`] is the only seam through which a language model is
//! reached. The runtime hands it a read-only transcript view plus the
//! current turn's tool scratch, and it answers with either final message
//! text or a request to call a tool.

use async_trait::async_trait;
use thiserror::Error;

use crate::identifiers::ToolName;
use crate::message::Transcript;
use crate::tool::{ToolCallRequest, ToolExchange};

/// What a backend produced for one generation step.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendResponse {
    /// Final text for this turn; the orchestrator appends it to the
    /// transcript.
    Final(String),
    /// The model wants a tool executed before it can answer.
    ToolCall(ToolCallRequest),
}

/// A backend generation failure.
#[derive(Debug, Clone, Error)]
#[error("backend error: {message}")]
pub struct BackendError {
    pub message: String,
    /// Whether retrying the same request could plausibly succeed.
    pub transient: bool,
}

impl BackendError {
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: false,
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: true,
        }
    }
}

/// Produces one generation step for a participant's turn.
///
/// `view` is the shared transcript up to and including the most recent
/// message. `scratch` holds the tool exchanges already completed inside
/// the current turn, oldest first. `catalogue` lists the tools the
/// participant may request; backends for tool-less participants receive
/// an empty slice and must answer with [`BackendResponse::Final`].
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(
        &self,
        view: &Transcript,
        scratch: &[ToolExchange],
        catalogue: &[ToolName],
    ) -> Result<BackendResponse, BackendError>;
}
