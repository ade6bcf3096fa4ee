//! In-memory tool routing for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use colloquy_core::{
    RouterError, ToolCallRequest, ToolName, ToolOutcome, ToolResult, ToolRouter,
};

type ToolFn = Box<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Routes tool calls to registered closures, no subprocesses involved.
///
/// Unknown tools resolve to failed results, matching the production
/// workbench. Every request is recorded for later assertions.
#[derive(Default)]
pub struct InMemoryRouter {
    tools: HashMap<ToolName, ToolFn>,
    history: Mutex<Vec<ToolCallRequest>>,
    fail_routing: bool,
}

impl InMemoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool backed by a closure.
    pub fn with_tool<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.tools
            .insert(ToolName::new_unchecked(name), Box::new(handler));
        self
    }

    /// Make every invocation fail at the transport level, simulating a
    /// dead channel.
    pub fn failing(mut self) -> Self {
        self.fail_routing = true;
        self
    }

    /// Every request routed so far, in order.
    pub fn history(&self) -> Vec<ToolCallRequest> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.history.lock().map(|history| history.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ToolRouter for InMemoryRouter {
    fn tool_names(&self) -> Vec<ToolName> {
        let mut names: Vec<ToolName> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    async fn invoke(&self, request: &ToolCallRequest) -> Result<ToolResult, RouterError> {
        if let Ok(mut history) = self.history.lock() {
            history.push(request.clone());
        }
        if self.fail_routing {
            return Err(RouterError::new("channel is dead"));
        }
        let outcome = match self.tools.get(&request.tool) {
            Some(handler) => match handler(&request.arguments) {
                Ok(payload) => ToolOutcome::success(payload),
                Err(reason) => ToolOutcome::failure(reason),
            },
            None => ToolOutcome::failure(format!("unknown tool: {}", request.tool)),
        };
        Ok(ToolResult::new(request.id, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn routes_to_closure_and_records_history() {
        let router = InMemoryRouter::new()
            .with_tool("double", |args| {
                let n = args["n"].as_i64().ok_or("missing 'n'")?;
                Ok(json!({ "n": n * 2 }))
            });

        let request = ToolCallRequest::new(ToolName::new_unchecked("double"), json!({"n": 21}));
        let result = router.invoke(&request).await.unwrap();
        assert_eq!(result.outcome.payload().unwrap()["n"], 42);
        assert_eq!(router.call_count(), 1);
        assert_eq!(router.history()[0].tool.as_str(), "double");
    }

    #[tokio::test]
    async fn unknown_tool_is_a_failed_result() {
        let router = InMemoryRouter::new();
        let request = ToolCallRequest::new(ToolName::new_unchecked("missing"), json!({}));
        let result = router.invoke(&request).await.unwrap();
        assert!(!result.outcome.is_success());
    }

    #[tokio::test]
    async fn failing_router_errors_at_transport_level() {
        let router = InMemoryRouter::new().failing();
        let request = ToolCallRequest::new(ToolName::new_unchecked("any"), json!({}));
        assert!(router.invoke(&request).await.is_err());
    }
}
