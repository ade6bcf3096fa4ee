//! The tool routing seam between agents and tool execution.
//!
//! Agents talk to tools through [`ToolRouter`] only. The production
//! implementation is the subprocess workbench in `colloquy-workbench`;
//! tests substitute in-memory routers.

use async_trait::async_trait;
use thiserror::Error;

use crate::identifiers::ToolName;
use crate::tool::{ToolCallRequest, ToolResult};

/// A transport-level routing failure.
///
/// Tools that run and report their own failure resolve to a failed
/// [`ToolResult`] instead; a `RouterError` means the request could not
/// be carried to a tool at all and fails the turn.
#[derive(Debug, Clone, Error)]
#[error("tool routing failed: {message}")]
pub struct RouterError {
    pub message: String,
}

impl RouterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Routes tool-call requests to whatever executes them.
#[async_trait]
pub trait ToolRouter: Send + Sync {
    /// The tools this router can reach, sorted by name.
    fn tool_names(&self) -> Vec<ToolName>;

    /// Resolve one request to exactly one result.
    async fn invoke(&self, request: &ToolCallRequest) -> Result<ToolResult, RouterError>;
}
