//! Declarative termination conditions for conversation runs.
//!
//! Conditions are evaluated by the orchestrator after every transcript
//! append, against the whole transcript. Composite conditions combine
//! children in declaration order and short-circuit on the first decisive
//! child, so the leftmost condition that fires determines the reported
//! [`StopReason`].

use serde::{Deserialize, Serialize};

use crate::event::StopReason;
use crate::identifiers::ParticipantName;
use crate::message::Transcript;

/// A condition that decides when a conversation run stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "condition", rename_all = "snake_case")]
pub enum TerminationCondition {
    /// Fires once the transcript holds at least this many messages,
    /// counting the seeded initial task.
    MaxMessages(usize),
    /// Fires when the most recent message contains `pattern` as a
    /// substring. With a `source`, only messages authored by that exact
    /// participant are considered.
    TextMention {
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<ParticipantName>,
    },
    /// Fires only when every child fires. Children are evaluated left to
    /// right and evaluation stops at the first child that does not fire.
    All(Vec<TerminationCondition>),
    /// Fires when any child fires. Children are evaluated left to right
    /// and evaluation stops at the first child that fires.
    Any(Vec<TerminationCondition>),
}

impl TerminationCondition {
    /// Whether this condition fires against the given transcript.
    pub fn evaluate(&self, transcript: &Transcript) -> bool {
        self.eval_counted(transcript, &mut 0)
    }

    fn eval_counted(&self, transcript: &Transcript, evaluations: &mut usize) -> bool {
        *evaluations += 1;
        match self {
            TerminationCondition::MaxMessages(limit) => transcript.len() >= *limit,
            TerminationCondition::TextMention { pattern, source } => {
                let Some(last) = transcript.last() else {
                    return false;
                };
                if let Some(source) = source
                    && last.speaker.participant() != Some(source)
                {
                    return false;
                }
                last.content.contains(pattern.as_str())
            }
            TerminationCondition::All(children) => {
                !children.is_empty()
                    && children
                        .iter()
                        .all(|child| child.eval_counted(transcript, evaluations))
            }
            TerminationCondition::Any(children) => children
                .iter()
                .any(|child| child.eval_counted(transcript, evaluations)),
        }
    }

    /// The stop reason this condition reports, if it fires.
    ///
    /// For composites this is the reason of the leftmost child that fired,
    /// matching the short-circuit order of [`evaluate`](Self::evaluate).
    pub fn stop_reason(&self, transcript: &Transcript) -> Option<StopReason> {
        match self {
            TerminationCondition::MaxMessages(limit) => {
                (transcript.len() >= *limit).then(|| StopReason::MaxMessagesReached { limit: *limit })
            }
            TerminationCondition::TextMention { .. } => {
                self.evaluate(transcript).then(|| StopReason::TextMatched {
                    description: self.describe(),
                })
            }
            TerminationCondition::All(children) => {
                if !self.evaluate(transcript) {
                    return None;
                }
                children
                    .first()
                    .and_then(|child| child.stop_reason(transcript))
            }
            TerminationCondition::Any(children) => children
                .iter()
                .find(|child| child.evaluate(transcript))
                .and_then(|child| child.stop_reason(transcript)),
        }
    }

    /// Human-readable description of the condition.
    pub fn describe(&self) -> String {
        match self {
            TerminationCondition::MaxMessages(limit) => format!("max_messages({limit})"),
            TerminationCondition::TextMention { pattern, source } => match source {
                Some(source) => format!("text_mention({pattern:?}, source={source})"),
                None => format!("text_mention({pattern:?})"),
            },
            TerminationCondition::All(children) => {
                let parts: Vec<String> = children.iter().map(Self::describe).collect();
                format!("all({})", parts.join(", "))
            }
            TerminationCondition::Any(children) => {
                let parts: Vec<String> = children.iter().map(Self::describe).collect();
                format!("any({})", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Speaker;

    fn say(transcript: &mut Transcript, who: &str, text: &str) {
        transcript.append(
            Speaker::Participant {
                name: ParticipantName::new_unchecked(who),
            },
            text.into(),
        );
    }

    #[test]
    fn max_messages_counts_seed() {
        let condition = TerminationCondition::MaxMessages(2);
        let mut transcript = Transcript::seeded("task");
        assert!(!condition.evaluate(&transcript));
        say(&mut transcript, "a", "reply");
        assert!(condition.evaluate(&transcript));
        assert_eq!(
            condition.stop_reason(&transcript),
            Some(StopReason::MaxMessagesReached { limit: 2 })
        );
    }

    #[test]
    fn text_mention_inspects_only_last_message() {
        let condition = TerminationCondition::TextMention {
            pattern: "TERMINATE".into(),
            source: None,
        };
        let mut transcript = Transcript::seeded("task");
        say(&mut transcript, "a", "we should TERMINATE soon");
        assert!(condition.evaluate(&transcript));
        say(&mut transcript, "b", "still working");
        assert!(!condition.evaluate(&transcript));
    }

    #[test]
    fn text_mention_source_filter() {
        let condition = TerminationCondition::TextMention {
            pattern: "done".into(),
            source: Some(ParticipantName::new_unchecked("closer")),
        };
        let mut transcript = Transcript::seeded("task");
        say(&mut transcript, "other", "done");
        assert!(!condition.evaluate(&transcript));
        say(&mut transcript, "closer", "done");
        assert!(condition.evaluate(&transcript));
    }

    #[test]
    fn text_mention_ignores_user_seed_when_source_set() {
        let condition = TerminationCondition::TextMention {
            pattern: "task".into(),
            source: Some(ParticipantName::new_unchecked("a")),
        };
        let transcript = Transcript::seeded("task");
        assert!(!condition.evaluate(&transcript));
    }

    #[test]
    fn empty_transcript_never_matches_text() {
        let condition = TerminationCondition::TextMention {
            pattern: "".into(),
            source: None,
        };
        assert!(!condition.evaluate(&Transcript::new()));
    }

    #[test]
    fn all_requires_every_child() {
        let mut transcript = Transcript::seeded("t");
        say(&mut transcript, "a", "finished");
        let both = TerminationCondition::All(vec![
            TerminationCondition::MaxMessages(2),
            TerminationCondition::TextMention {
                pattern: "finished".into(),
                source: None,
            },
        ]);
        assert!(both.evaluate(&transcript));

        let unmet = TerminationCondition::All(vec![
            TerminationCondition::MaxMessages(10),
            TerminationCondition::MaxMessages(1),
        ]);
        assert!(!unmet.evaluate(&transcript));
        assert!(!TerminationCondition::All(vec![]).evaluate(&transcript));
    }

    #[test]
    fn any_reports_leftmost_firing_child() {
        let mut transcript = Transcript::seeded("t");
        say(&mut transcript, "a", "APPROVED");
        let condition = TerminationCondition::Any(vec![
            TerminationCondition::TextMention {
                pattern: "APPROVED".into(),
                source: None,
            },
            TerminationCondition::MaxMessages(1),
        ]);
        assert!(condition.evaluate(&transcript));
        assert!(matches!(
            condition.stop_reason(&transcript),
            Some(StopReason::TextMatched { description }) if description.contains("APPROVED")
        ));
    }

    #[test]
    fn any_short_circuits_on_first_firing_child() {
        let transcript = Transcript::seeded("go");
        let condition = TerminationCondition::Any(vec![
            TerminationCondition::MaxMessages(1),
            TerminationCondition::MaxMessages(1),
            TerminationCondition::MaxMessages(1),
        ]);
        let mut evaluations = 0;
        assert!(condition.eval_counted(&transcript, &mut evaluations));
        // Any itself plus its first child only.
        assert_eq!(evaluations, 2);
    }

    #[test]
    fn all_short_circuits_on_first_non_firing_child() {
        let transcript = Transcript::seeded("go");
        let condition = TerminationCondition::All(vec![
            TerminationCondition::MaxMessages(99),
            TerminationCondition::MaxMessages(1),
        ]);
        let mut evaluations = 0;
        assert!(!condition.eval_counted(&transcript, &mut evaluations));
        assert_eq!(evaluations, 2);
    }

    #[test]
    fn describe_is_structured() {
        let condition = TerminationCondition::Any(vec![
            TerminationCondition::MaxMessages(5),
            TerminationCondition::TextMention {
                pattern: "stop".into(),
                source: Some(ParticipantName::new_unchecked("judge")),
            },
        ]);
        assert_eq!(
            condition.describe(),
            "any(max_messages(5), text_mention(\"stop\", source=judge))"
        );
    }
}
