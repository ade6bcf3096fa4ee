//! Conversation messages and the append-only transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identifiers::ParticipantName;

/// Who authored a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Speaker {
    /// The virtual user role that carries the initial task.
    User,
    /// A registered conversation participant.
    Participant { name: ParticipantName },
}

impl Speaker {
    /// The participant name, if this message came from a participant.
    pub fn participant(&self) -> Option<&ParticipantName> {
        match self {
            Speaker::User => None,
            Speaker::Participant { name } => Some(name),
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "user"),
            Speaker::Participant { name } => write!(f, "{name}"),
        }
    }
}

/// A single transcript entry. Immutable once appended.
///
/// Sequence numbers are assigned by the owning [`Transcript`], are
/// transcript-global, and increase monotonically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub seq: u64,
    pub speaker: Speaker,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only ordered log of conversation messages.
///
/// The orchestrator exclusively owns the transcript for the duration of a
/// run. Agents only ever see a shared `&Transcript` view and hand back the
/// text to append; they never mutate the log themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
    next_seq: u64,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transcript seeded with the initial task from the virtual
    /// user role.
    pub fn seeded(initial_task: impl Into<String>) -> Self {
        let mut transcript = Self::new();
        transcript.append(Speaker::User, initial_task.into());
        transcript
    }

    /// Append a message, assigning the next sequence number. Returns a
    /// reference to the appended entry.
    pub fn append(&mut self, speaker: Speaker, content: String) -> &Message {
        let message = Message {
            seq: self.next_seq,
            speaker,
            content,
            timestamp: Utc::now(),
        };
        self.next_seq += 1;
        let idx = self.messages.len();
        self.messages.push(message);
        &self.messages[idx]
    }

    /// All messages in append order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recently appended message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(name: &str) -> Speaker {
        Speaker::Participant {
            name: ParticipantName::new_unchecked(name),
        }
    }

    #[test]
    fn seeded_transcript_starts_with_user_message() {
        let transcript = Transcript::seeded("Begin the pipeline");
        assert_eq!(transcript.len(), 1);
        let seed = transcript.last().unwrap();
        assert_eq!(seed.speaker, Speaker::User);
        assert_eq!(seed.content, "Begin the pipeline");
        assert_eq!(seed.seq, 0);
    }

    #[test]
    fn sequence_numbers_are_monotonic() {
        let mut transcript = Transcript::seeded("task");
        transcript.append(participant("a"), "one".into());
        transcript.append(participant("b"), "two".into());

        let seqs: Vec<u64> = transcript.messages().iter().map(|m| m.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn speaker_participant_accessor() {
        assert_eq!(Speaker::User.participant(), None);
        let speaker = participant("agent-1");
        assert_eq!(speaker.participant().unwrap().as_str(), "agent-1");
    }
}
