//! Tool routing across a set of channels.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use colloquy_core::{RouterError, ToolCallRequest, ToolName, ToolOutcome, ToolResult, ToolRouter};

use crate::channel::{ChannelConfig, ToolChannel};
use crate::error::ChannelResult;

/// Routes tool invocations to the channel whose server advertised the
/// tool.
///
/// When two servers advertise the same tool name, the channel attached
/// first wins and the later advertisement is ignored. Channels are held
/// behind `Arc` and may be shared with other workbenches; the channel's
/// own turn lock keeps shared use single-writer.
#[derive(Default)]
pub struct Workbench {
    channels: Vec<Arc<ToolChannel>>,
    routes: HashMap<ToolName, usize>,
}

impl Workbench {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a tool server and attach the resulting channel.
    pub async fn connect(&mut self, config: ChannelConfig) -> ChannelResult<()> {
        let channel = ToolChannel::connect(config).await?;
        self.attach(Arc::new(channel));
        Ok(())
    }

    /// Attach an already-connected channel, registering its catalogue.
    pub fn attach(&mut self, channel: Arc<ToolChannel>) {
        let index = self.channels.len();
        for tool in channel.tools() {
            match self.routes.entry(tool.clone()) {
                std::collections::hash_map::Entry::Vacant(entry) => {
                    entry.insert(index);
                }
                std::collections::hash_map::Entry::Occupied(_) => {
                    debug!(%tool, command = channel.command(), "tool already registered, ignoring duplicate");
                }
            }
        }
        self.channels.push(channel);
    }

    /// All routable tool names, sorted.
    pub fn tool_names(&self) -> Vec<ToolName> {
        let mut names: Vec<ToolName> = self.routes.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn supports(&self, tool: &ToolName) -> bool {
        self.routes.contains_key(tool)
    }

    /// Route a request to the owning channel and wait for its result.
    ///
    /// A request for a tool no server advertised resolves to a failed
    /// result rather than an error, so the model can read the failure
    /// and recover conversationally.
    #[instrument(skip(self, request), fields(tool = %request.tool))]
    pub async fn invoke(&self, request: &ToolCallRequest) -> ChannelResult<ToolResult> {
        let Some(channel) = self.routes.get(&request.tool).map(|&i| &self.channels[i]) else {
            return Ok(ToolResult::new(
                request.id,
                ToolOutcome::failure(format!("unknown tool: {}", request.tool)),
            ));
        };
        channel.invoke(request).await
    }

    /// Release every channel, killing the server processes. Every
    /// channel is released even when an earlier one fails; the first
    /// failure is reported afterwards.
    pub async fn release(self) -> ChannelResult<()> {
        let mut outcome = Ok(());
        for channel in self.channels {
            if let Err(err) = channel.release().await
                && outcome.is_ok()
            {
                outcome = Err(err);
            }
        }
        outcome
    }
}

#[async_trait]
impl ToolRouter for Workbench {
    fn tool_names(&self) -> Vec<ToolName> {
        Workbench::tool_names(self)
    }

    async fn invoke(&self, request: &ToolCallRequest) -> Result<ToolResult, RouterError> {
        Workbench::invoke(self, request)
            .await
            .map_err(|err| RouterError::new(err.to_string()))
    }
}
