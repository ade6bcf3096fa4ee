//! # Colloquy Core
//!
//! Core types and traits for the Colloquy multi-agent conversation
//! runtime: the append-only transcript, validated identifiers, tool-call
//! data model, termination conditions, conversation events, and the
//! [`ModelBackend`] seam that connects a participant to a language model.
//!
//! This crate carries no I/O. Subprocess tool channels live in
//! `colloquy-workbench` and the turn scheduler lives in `colloquy`.

pub mod backend;
pub mod error;
pub mod event;
pub mod identifiers;
pub mod message;
pub mod router;
pub mod termination;
pub mod tool;

pub use backend::{BackendError, BackendResponse, ModelBackend};
pub use error::{MAX_ID_LENGTH, ValidationError};
pub use event::{ConversationEvent, StopReason};
pub use identifiers::{CorrelationId, ParticipantName, ToolName};
pub use message::{Message, Speaker, Transcript};
pub use router::{RouterError, ToolRouter};
pub use termination::TerminationCondition;
pub use tool::{ToolCallRequest, ToolExchange, ToolOutcome, ToolResult};
