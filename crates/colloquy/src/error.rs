//! Runtime error types.

use std::time::Duration;

use thiserror::Error;

use colloquy_core::{BackendError, ParticipantName, RouterError, ToolName};

/// Failure of a single participant's turn.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model backend reported a failure.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The backend did not answer within the invocation timeout.
    #[error("backend timed out after {0:?}")]
    Timeout(Duration),

    /// The backend requested a tool but the participant has no
    /// workbench attached.
    #[error("backend requested tool '{0}' but no workbench is attached")]
    NoWorkbench(ToolName),

    /// The tool router failed while resolving a tool call.
    #[error(transparent)]
    Router(#[from] RouterError),

    /// The turn requested more tool calls than the configured cap.
    #[error("turn exceeded the tool iteration cap of {limit}")]
    ToolIterationsExceeded { limit: usize },

    /// The run was cancelled while this turn was in flight.
    #[error("turn cancelled")]
    Cancelled,
}

/// Conversation setup errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    /// A run needs at least one participant.
    #[error("a conversation needs at least one participant")]
    NoParticipants,

    /// Participant names must be unique within a run.
    #[error("duplicate participant name: {0}")]
    DuplicateParticipant(ParticipantName),
}
