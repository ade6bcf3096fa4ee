//! Tool channel error types.

use std::time::Duration;
use thiserror::Error;

/// Channel operation result type.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors raised by a tool channel or the workbench routing over it.
///
/// These are transport-level failures. A tool that runs and reports its
/// own failure is not a channel error; it resolves to a failed
/// [`colloquy_core::ToolResult`] instead.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The tool server process could not be spawned.
    #[error("failed to spawn tool server '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The capability handshake failed or the server closed before
    /// answering it.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The server broke the framing contract, e.g. an unparseable line
    /// or a response with an unknown correlation id.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// No response arrived within the configured read timeout.
    #[error("tool invocation timed out after {0:?}")]
    Timeout(Duration),

    /// The channel was previously marked dead; no further invocations
    /// are possible.
    #[error("tool channel is dead")]
    Dead,

    /// The server closed its end of the channel.
    #[error("tool channel closed by server")]
    Closed,

    /// A frame could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Reading or writing the channel's pipes failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
