//! # Colloquy Workbench
//!
//! Subprocess tool execution for Colloquy agents. Tool servers are
//! external processes speaking newline-delimited JSON over stdio; a
//! [`ToolChannel`] manages one server and the [`Workbench`] routes tool
//! calls across channels by advertised name.
//!
//! The crate also ships the server half ([`ToolServer`]) so tool
//! servers can be written in Rust against the same frame types.

pub mod channel;
pub mod error;
pub mod protocol;
pub mod server;
pub mod workbench;

pub use channel::{ChannelConfig, DEFAULT_READ_TIMEOUT, ToolChannel};
pub use error::{ChannelError, ChannelResult};
pub use protocol::{WireRequest, WireResponse};
pub use server::{ServerTool, ToolServer};
pub use workbench::Workbench;
