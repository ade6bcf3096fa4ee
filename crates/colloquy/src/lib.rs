//! # Colloquy
//!
//! A strictly ordered multi-agent conversation runtime. Participants
//! take turns round-robin over a shared append-only transcript;
//! declarative termination conditions decide when the run stops; tool
//! calls route through a workbench of subprocess tool servers.
//!
//! ```no_run
//! use std::sync::Arc;
//! use colloquy::{
//!     Agent, Orchestrator, RunConfig, TerminationCondition, ParticipantName,
//! };
//! # use colloquy_testing::StaticBackend;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfig::new(
//!     "Summarize the incident report",
//!     TerminationCondition::Any(vec![
//!         TerminationCondition::TextMention {
//!             pattern: "TERMINATE".into(),
//!             source: None,
//!         },
//!         TerminationCondition::MaxMessages(20),
//!     ]),
//! );
//!
//! let mut orchestrator = Orchestrator::new(config);
//! orchestrator.add_participant(
//!     ParticipantName::parse("writer")?,
//!     Agent::new(Arc::new(StaticBackend::new("draft"))),
//! )?;
//! let outcome = orchestrator.run().await?;
//! println!("stopped: {}", outcome.stop_reason);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod events;
pub mod orchestrator;

pub use agent::Agent;
pub use config::{DEFAULT_INVOCATION_TIMEOUT, DEFAULT_MAX_TOOL_ITERATIONS, RunConfig};
pub use error::{AgentError, OrchestratorError};
pub use events::{DEFAULT_EVENT_CAPACITY, EventEmitter, EventStream, event_channel};
pub use orchestrator::{Orchestrator, RunOutcome};

pub use colloquy_core::{
    BackendError, BackendResponse, ConversationEvent, CorrelationId, Message, ModelBackend,
    ParticipantName, RouterError, Speaker, StopReason, TerminationCondition, ToolCallRequest,
    ToolExchange, ToolName, ToolOutcome, ToolResult, ToolRouter, Transcript,
};
pub use colloquy_workbench::{ChannelConfig, ChannelError, ToolChannel, Workbench};
