//! Turn events emitted by a conversation run, and the reasons a run stops.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identifiers::ParticipantName;
use crate::message::Message;
use crate::tool::{ToolCallRequest, ToolResult};

/// Why a conversation run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The transcript reached the configured message cap.
    MaxMessagesReached { limit: usize },
    /// A text-mention condition matched; the description names the
    /// condition that fired.
    TextMatched { description: String },
    /// The run was cancelled cooperatively.
    Cancelled,
    /// A participant's turn failed; the run does not resume with another
    /// participant.
    AgentFailure {
        participant: ParticipantName,
        cause: String,
    },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::MaxMessagesReached { limit } => {
                write!(f, "message cap reached ({limit})")
            }
            StopReason::TextMatched { description } => write!(f, "matched {description}"),
            StopReason::Cancelled => write!(f, "cancelled"),
            StopReason::AgentFailure { participant, cause } => {
                write!(f, "participant '{participant}' failed: {cause}")
            }
        }
    }
}

/// Events delivered to the sink in strict chronological order.
///
/// A run always terminates its stream with [`ConversationEvent::ConversationEnded`],
/// including on failure paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ConversationEvent {
    ConversationStarted {
        participants: Vec<ParticipantName>,
    },
    TurnStarted {
        participant: ParticipantName,
        /// 1-based turn counter over the whole run.
        turn: u64,
    },
    MessageAppended {
        message: Message,
    },
    ToolInvoked {
        request: ToolCallRequest,
    },
    ToolResolved {
        result: ToolResult,
    },
    ConversationEnded {
        stop_reason: StopReason,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_reason_display() {
        assert_eq!(
            StopReason::MaxMessagesReached { limit: 7 }.to_string(),
            "message cap reached (7)"
        );
        assert_eq!(StopReason::Cancelled.to_string(), "cancelled");
        let failure = StopReason::AgentFailure {
            participant: ParticipantName::new_unchecked("FileAgent"),
            cause: "backend timed out".into(),
        };
        assert_eq!(
            failure.to_string(),
            "participant 'FileAgent' failed: backend timed out"
        );
    }

    #[test]
    fn events_serialize_with_event_tag() {
        let event = ConversationEvent::ConversationEnded {
            stop_reason: StopReason::Cancelled,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "conversation_ended");
        assert_eq!(json["stop_reason"]["reason"], "cancelled");
    }
}
