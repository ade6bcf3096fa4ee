//! Round-robin turn scheduling.
//!
//! The orchestrator owns the transcript for the duration of a run and
//! drives participants strictly in registration order: participant 0,
//! 1, .., n-1, then 0 again. Exactly one turn is in flight at any time.
//! Termination conditions are evaluated after every transcript append,
//! including the seeded initial task, and the leftmost firing condition
//! determines the reported stop reason.

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use colloquy_core::{
    ConversationEvent, ParticipantName, Speaker, StopReason, Transcript,
};

use crate::agent::Agent;
use crate::config::RunConfig;
use crate::error::{AgentError, OrchestratorError};
use crate::events::{EventEmitter, EventStream, event_channel};

/// What a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub transcript: Transcript,
    pub stop_reason: StopReason,
}

struct Participant {
    name: ParticipantName,
    agent: Agent,
}

/// Drives one conversation to completion.
pub struct Orchestrator {
    participants: Vec<Participant>,
    config: RunConfig,
    emitter: EventEmitter,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(config: RunConfig) -> Self {
        Self {
            participants: Vec::new(),
            config,
            emitter: EventEmitter::disabled(),
            cancel: CancellationToken::new(),
        }
    }

    /// Register a participant. Turn order is registration order.
    pub fn add_participant(
        &mut self,
        name: ParticipantName,
        agent: Agent,
    ) -> Result<(), OrchestratorError> {
        if self.participants.iter().any(|p| p.name == name) {
            return Err(OrchestratorError::DuplicateParticipant(name));
        }
        self.participants.push(Participant { name, agent });
        Ok(())
    }

    /// Attach an event emitter; events flow for the whole run.
    pub fn with_event_emitter(mut self, emitter: EventEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// Create a bounded event channel, install its emitter, and hand
    /// back the receiving half. Call before [`run`](Self::run).
    pub fn events(&mut self, capacity: usize) -> EventStream {
        let (emitter, stream) = event_channel(capacity);
        self.emitter = emitter;
        stream
    }

    /// A token that cancels the run cooperatively. Cancellation stops
    /// the conversation at the next opportunity; it does not kill tool
    /// server processes.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the conversation until a termination condition fires, the
    /// run is cancelled, or a turn fails.
    ///
    /// The event stream always closes with
    /// [`ConversationEvent::ConversationEnded`], on failure paths
    /// included.
    #[instrument(skip(self), fields(participants = self.participants.len()))]
    pub async fn run(self) -> Result<RunOutcome, OrchestratorError> {
        if self.participants.is_empty() {
            return Err(OrchestratorError::NoParticipants);
        }

        self.emitter
            .emit(ConversationEvent::ConversationStarted {
                participants: self.participants.iter().map(|p| p.name.clone()).collect(),
            })
            .await;

        let mut transcript = Transcript::seeded(self.config.initial_task.clone());
        if let Some(seed) = transcript.last() {
            self.emitter
                .emit(ConversationEvent::MessageAppended {
                    message: seed.clone(),
                })
                .await;
        }

        // The seed counts; a cap of 1 ends the run before any turn.
        if let Some(stop_reason) = self.config.termination.stop_reason(&transcript) {
            return Ok(self.finish(transcript, stop_reason).await);
        }

        let mut turn: u64 = 0;
        let stop_reason = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            let participant = &self.participants[(turn as usize) % self.participants.len()];
            turn += 1;
            self.emitter
                .emit(ConversationEvent::TurnStarted {
                    participant: participant.name.clone(),
                    turn,
                })
                .await;

            match participant
                .agent
                .respond(&transcript, &self.config, &self.cancel, &self.emitter)
                .await
            {
                Ok(text) => {
                    let message = transcript
                        .append(
                            Speaker::Participant {
                                name: participant.name.clone(),
                            },
                            text,
                        )
                        .clone();
                    self.emitter
                        .emit(ConversationEvent::MessageAppended { message })
                        .await;
                    if let Some(stop_reason) = self.config.termination.stop_reason(&transcript) {
                        break stop_reason;
                    }
                }
                Err(AgentError::Cancelled) => break StopReason::Cancelled,
                Err(err) => {
                    warn!(participant = %participant.name, %err, "turn failed, ending run");
                    break StopReason::AgentFailure {
                        participant: participant.name.clone(),
                        cause: err.to_string(),
                    };
                }
            }
        };

        Ok(self.finish(transcript, stop_reason).await)
    }

    async fn finish(&self, transcript: Transcript, stop_reason: StopReason) -> RunOutcome {
        info!(%stop_reason, messages = transcript.len(), "conversation ended");
        self.emitter
            .emit(ConversationEvent::ConversationEnded {
                stop_reason: stop_reason.clone(),
            })
            .await;
        RunOutcome {
            transcript,
            stop_reason,
        }
    }
}
