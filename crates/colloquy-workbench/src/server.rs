//! Server side of the stdio tool protocol.
//!
//! A [`ToolServer`] hosts a set of [`ServerTool`] implementations and
//! serves them over stdin/stdout, one JSON frame per line. Anything a
//! server wants to log must go to stderr; stdout belongs to the
//! protocol.

use std::collections::HashMap;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use colloquy_core::ToolName;

use crate::protocol::{WireRequest, WireResponse};

/// A tool hosted by a [`ToolServer`].
pub trait ServerTool: Send + Sync {
    fn name(&self) -> ToolName;

    /// Run the tool. An `Err` becomes a failed response frame; the
    /// string should tell the caller what went wrong.
    fn call(&self, arguments: Value) -> Result<Value, String>;
}

/// Hosts tools behind the stdio wire protocol.
#[derive(Default)]
pub struct ToolServer {
    tools: HashMap<ToolName, Box<dyn ServerTool>>,
}

impl ToolServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A later registration under the same name
    /// replaces the earlier one.
    pub fn register(mut self, tool: impl ServerTool + 'static) -> Self {
        self.tools.insert(tool.name(), Box::new(tool));
        self
    }

    fn catalogue(&self) -> Vec<ToolName> {
        let mut names: Vec<ToolName> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    fn handle(&self, request: WireRequest) -> WireResponse {
        match request {
            WireRequest::Hello { id } => WireResponse::hello(id, self.catalogue()),
            WireRequest::Call {
                id,
                tool,
                arguments,
            } => match self.tools.get(&tool) {
                Some(handler) => match handler.call(arguments) {
                    Ok(payload) => WireResponse::success(id, payload),
                    Err(reason) => WireResponse::failure(id, reason),
                },
                None => WireResponse::failure(id, format!("unknown tool: {tool}")),
            },
        }
    }

    /// Serve requests from stdin until it closes.
    pub async fn serve_stdio(self) -> std::io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let request: WireRequest = match serde_json::from_str(line) {
                Ok(request) => request,
                Err(err) => {
                    warn!(%err, "dropping unparseable request frame");
                    continue;
                }
            };
            let response = self.handle(request);
            let mut frame = serde_json::to_string(&response)
                .map_err(|err| std::io::Error::other(err.to_string()))?;
            frame.push('\n');
            stdout.write_all(frame.as_bytes()).await?;
            stdout.flush().await?;
        }
        debug!("stdin closed, shutting down tool server");
        Ok(())
    }
}
