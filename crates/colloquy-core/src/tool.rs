//! Tool-call requests and results exchanged between agents and a workbench.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::{CorrelationId, ToolName};

/// A request to invoke a specific tool with structured arguments.
///
/// Every request carries a correlation id; the channel that carries it is
/// responsible for resolving it to exactly one [`ToolResult`] (or a channel
/// failure).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: CorrelationId,
    pub tool: ToolName,
    pub arguments: Value,
}

impl ToolCallRequest {
    /// Create a request with a freshly generated correlation id.
    pub fn new(tool: ToolName, arguments: Value) -> Self {
        Self {
            id: CorrelationId::generate(),
            tool,
            arguments,
        }
    }
}

/// Outcome of a tool execution: either a structured payload or a failure
/// description the model can read and recover from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { payload: Value },
    Failure { reason: String },
}

impl ToolOutcome {
    pub fn success(payload: Value) -> Self {
        ToolOutcome::Success { payload }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        ToolOutcome::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success { .. })
    }

    /// The payload for a success, `None` for a failure.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ToolOutcome::Success { payload } => Some(payload),
            ToolOutcome::Failure { .. } => None,
        }
    }

    /// The failure reason, `None` for a success.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            ToolOutcome::Success { .. } => None,
            ToolOutcome::Failure { reason } => Some(reason),
        }
    }
}

/// The resolution of one [`ToolCallRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub id: CorrelationId,
    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn new(id: CorrelationId, outcome: ToolOutcome) -> Self {
        Self { id, outcome }
    }
}

/// One completed request/result pair in an agent's per-turn scratch context.
///
/// Exchanges accumulate inside a single turn and are fed back to the model
/// backend; they never enter the shared transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExchange {
    pub request: ToolCallRequest,
    pub result: ToolResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_gets_unique_correlation_id() {
        let tool = ToolName::new_unchecked("echo");
        let a = ToolCallRequest::new(tool.clone(), json!({"text": "hi"}));
        let b = ToolCallRequest::new(tool, json!({"text": "hi"}));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn outcome_accessors() {
        let ok = ToolOutcome::success(json!({"rows": 3}));
        assert!(ok.is_success());
        assert_eq!(ok.payload().unwrap()["rows"], 3);
        assert!(ok.failure_reason().is_none());

        let failed = ToolOutcome::failure("table missing");
        assert!(!failed.is_success());
        assert_eq!(failed.failure_reason(), Some("table missing"));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(ToolOutcome::failure("nope")).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["reason"], "nope");
    }
}
