//! Subprocess tool channels.
//!
//! A [`ToolChannel`] owns one tool server child process and speaks the
//! newline-delimited JSON protocol over its stdin/stdout. A background
//! dispatcher task reads response frames and resolves them against a
//! correlation map. The channel is a single-writer resource: an async
//! mutex serializes invocations so at most one request is outstanding,
//! even when the channel is shared across agents or runs.
//!
//! A channel that observes a protocol violation, a closed pipe, or a
//! read timeout transitions to the dead state. Dead channels fail every
//! further invocation with [`ChannelError::Dead`] and are never revived.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use colloquy_core::{CorrelationId, ToolCallRequest, ToolName, ToolOutcome, ToolResult};

use crate::error::{ChannelError, ChannelResult};
use crate::protocol::{WireRequest, WireResponse};

/// Default time to wait for a response frame.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// How to spawn and talk to a tool server process.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    command: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    read_timeout: Duration,
}

impl ChannelConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: Vec::new(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

#[derive(Debug, Default)]
struct Shared {
    pending: Mutex<HashMap<CorrelationId, oneshot::Sender<WireResponse>>>,
    dead: AtomicBool,
    // Set before the senders are dropped when the server broke the
    // framing contract, so waiters can tell a violation from a clean
    // close.
    fault: OnceLock<String>,
}

impl Shared {
    fn mark_dead(&self) {
        self.dead.store(true, Ordering::SeqCst);
    }

    fn is_dead(&self) -> bool {
        self.dead.load(Ordering::SeqCst)
    }

    fn poison(&self, reason: String) {
        let _ = self.fault.set(reason);
    }

    fn fault(&self) -> Option<&str> {
        self.fault.get().map(String::as_str)
    }
}

/// A live connection to one tool server subprocess.
#[derive(Debug)]
pub struct ToolChannel {
    command: String,
    tools: Vec<ToolName>,
    read_timeout: Duration,
    // Held across a whole request/response exchange; the server speaks
    // one turn at a time.
    turn: Mutex<ChildStdin>,
    shared: Arc<Shared>,
    child: Mutex<Child>,
    dispatcher: JoinHandle<()>,
}

impl ToolChannel {
    /// Spawn the configured tool server and perform the capability
    /// handshake. The returned channel knows the server's tool
    /// catalogue.
    #[instrument(skip(config), fields(command = %config.command))]
    pub async fn connect(config: ChannelConfig) -> ChannelResult<Self> {
        let mut command = Command::new(&config.command);
        command
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        for (key, value) in &config.env {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(|source| ChannelError::Spawn {
            command: config.command.clone(),
            source,
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChannelError::Handshake("stdin was not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ChannelError::Handshake("stdout was not captured".into()))?;

        let shared = Arc::new(Shared::default());
        let dispatcher = tokio::spawn(dispatch_responses(
            stdout,
            Arc::clone(&shared),
            config.command.clone(),
        ));

        let mut channel = Self {
            command: config.command,
            tools: Vec::new(),
            read_timeout: config.read_timeout,
            turn: Mutex::new(stdin),
            shared,
            child: Mutex::new(child),
            dispatcher,
        };

        let hello = WireRequest::Hello {
            id: CorrelationId::generate(),
        };
        let response = channel
            .send_frame(&hello)
            .await
            .map_err(|err| ChannelError::Handshake(err.to_string()))?;
        channel.tools = response
            .tools
            .ok_or_else(|| ChannelError::Handshake("hello response carried no tool catalogue".into()))?;

        debug!(tools = channel.tools.len(), "tool channel connected");
        Ok(channel)
    }

    /// The tools this server advertised during the handshake.
    pub fn tools(&self) -> &[ToolName] {
        &self.tools
    }

    /// The command this channel was spawned from.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn is_dead(&self) -> bool {
        self.shared.is_dead()
    }

    /// Invoke a tool on this server.
    ///
    /// A failure reported by the tool itself resolves to an `Ok` result
    /// carrying [`ToolOutcome::Failure`]; an `Err` means the channel
    /// could not complete the exchange at all.
    #[instrument(skip(self, request), fields(tool = %request.tool, id = %request.id))]
    pub async fn invoke(&self, request: &ToolCallRequest) -> ChannelResult<ToolResult> {
        let frame = WireRequest::Call {
            id: request.id,
            tool: request.tool.clone(),
            arguments: request.arguments.clone(),
        };
        let response = self.send_frame(&frame).await?;
        let outcome = if response.ok {
            ToolOutcome::success(response.payload.unwrap_or(Value::Null))
        } else {
            ToolOutcome::failure(
                response
                    .error
                    .unwrap_or_else(|| "tool failed without a reason".into()),
            )
        };
        Ok(ToolResult::new(request.id, outcome))
    }

    async fn send_frame(&self, frame: &WireRequest) -> ChannelResult<WireResponse> {
        // One outstanding request at a time; the lock covers the whole
        // exchange.
        let mut stdin = self.turn.lock().await;
        if self.shared.is_dead() {
            return Err(ChannelError::Dead);
        }

        let mut line = serde_json::to_string(frame)?;
        line.push('\n');

        let id = frame.id();
        let (tx, rx) = oneshot::channel();
        self.shared.pending.lock().await.insert(id, tx);
        let write_result = match stdin.write_all(line.as_bytes()).await {
            Ok(()) => stdin.flush().await,
            Err(err) => Err(err),
        };
        if let Err(err) = write_result {
            self.shared.pending.lock().await.remove(&id);
            self.shared.mark_dead();
            return Err(ChannelError::Io(err));
        }

        match tokio::time::timeout(self.read_timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            // The dispatcher dropped our sender: a framing fault if one
            // was recorded, otherwise the pipe closed.
            Ok(Err(_)) => Err(match self.shared.fault() {
                Some(reason) => ChannelError::Protocol(reason.to_string()),
                None => ChannelError::Closed,
            }),
            Err(_) => {
                self.shared.pending.lock().await.remove(&id);
                self.shared.mark_dead();
                Err(ChannelError::Timeout(self.read_timeout))
            }
        }
    }

    /// Shut the channel down, killing the server process.
    pub async fn release(&self) -> ChannelResult<()> {
        self.shared.mark_dead();
        self.dispatcher.abort();
        let mut child = self.child.lock().await;
        child.kill().await?;
        Ok(())
    }
}

async fn dispatch_responses(stdout: ChildStdout, shared: Arc<Shared>, command: String) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let response: WireResponse = match serde_json::from_str(line) {
                    Ok(response) => response,
                    Err(err) => {
                        warn!(%command, %err, "unparseable response frame, killing channel");
                        shared.poison(format!("unparseable response frame: {err}"));
                        break;
                    }
                };
                let sender = shared.pending.lock().await.remove(&response.id);
                match sender {
                    Some(tx) => {
                        // The receiver may have been cancelled; a drop
                        // here is not an error.
                        let _ = tx.send(response);
                    }
                    None => {
                        warn!(%command, id = %response.id, "response with unknown correlation id, killing channel");
                        shared.poison(format!(
                            "response with unknown correlation id {}",
                            response.id
                        ));
                        break;
                    }
                }
            }
            Ok(None) => {
                debug!(%command, "tool server closed stdout");
                break;
            }
            Err(err) => {
                warn!(%command, %err, "read error on tool channel");
                break;
            }
        }
    }
    shared.mark_dead();
    // Dropping the senders wakes every waiting invocation with Closed.
    shared.pending.lock().await.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_defaults() {
        let config = ChannelConfig::new("server")
            .arg("--flag")
            .env("KEY", "value");
        assert_eq!(config.command, "server");
        assert_eq!(config.args, vec!["--flag"]);
        assert_eq!(config.read_timeout, DEFAULT_READ_TIMEOUT);
    }

    #[test]
    fn config_read_timeout_override() {
        let config = ChannelConfig::new("server").read_timeout(Duration::from_millis(250));
        assert_eq!(config.read_timeout, Duration::from_millis(250));
    }
}
