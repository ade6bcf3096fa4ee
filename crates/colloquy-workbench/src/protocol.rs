//! Wire frames for the stdio tool protocol.
//!
//! Frames are newline-delimited JSON objects. The client writes one
//! request per line on the server's stdin and the server writes one
//! response per line on stdout, each response echoing the request's
//! correlation id. A response citing an id with no outstanding request
//! is a protocol violation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use colloquy_core::{CorrelationId, ToolName};

/// A request frame sent to a tool server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WireRequest {
    /// Capability handshake. Must be the first frame on a new channel;
    /// the server answers with its tool catalogue.
    Hello { id: CorrelationId },
    /// Invoke a named tool with structured arguments.
    Call {
        id: CorrelationId,
        tool: ToolName,
        arguments: Value,
    },
}

impl WireRequest {
    pub fn id(&self) -> CorrelationId {
        match self {
            WireRequest::Hello { id } => *id,
            WireRequest::Call { id, .. } => *id,
        }
    }
}

/// A response frame from a tool server.
///
/// Exactly one of `payload` and `error` is set, keyed off `ok`. A hello
/// response additionally carries the server's `tools` catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireResponse {
    pub id: CorrelationId,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolName>>,
}

impl WireResponse {
    pub fn success(id: CorrelationId, payload: Value) -> Self {
        Self {
            id,
            ok: true,
            payload: Some(payload),
            error: None,
            tools: None,
        }
    }

    pub fn failure(id: CorrelationId, error: impl Into<String>) -> Self {
        Self {
            id,
            ok: false,
            payload: None,
            error: Some(error.into()),
            tools: None,
        }
    }

    pub fn hello(id: CorrelationId, tools: Vec<ToolName>) -> Self {
        Self {
            id,
            ok: true,
            payload: None,
            error: None,
            tools: Some(tools),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn call_frame_shape() {
        let id = CorrelationId::generate();
        let frame = WireRequest::Call {
            id,
            tool: ToolName::new_unchecked("echo"),
            arguments: json!({"text": "hi"}),
        };
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["op"], "call");
        assert_eq!(value["tool"], "echo");
        assert_eq!(value["id"], id.to_string());
    }

    #[test]
    fn response_round_trip() {
        let id = CorrelationId::generate();
        let response = WireResponse::failure(id, "no such table");
        let line = serde_json::to_string(&response).unwrap();
        let parsed: WireResponse = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, response);
        assert!(!line.contains("payload"));
    }

    #[test]
    fn hello_carries_catalogue() {
        let response = WireResponse::hello(
            CorrelationId::generate(),
            vec![ToolName::new_unchecked("echo")],
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["tools"][0], "echo");
    }
}
