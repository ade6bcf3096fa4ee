//! Validated identifier types used throughout the Colloquy crates.
//!
//! All identifiers follow the parse-don't-validate pattern: `parse()`
//! constructors return a `Result` instead of panicking, and each identifier
//! is a distinct newtype so a [`ToolName`] cannot be passed where a
//! [`ParticipantName`] is expected.
//!
//! Validation rules, shared by every identifier type:
//! - non-empty, at most 128 characters
//! - no leading or trailing whitespace
//! - only alphanumeric characters, hyphens, underscores, and dots
//! - no path traversal sequences (`../`, `./`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{MAX_ID_LENGTH, ValidationError};

fn validate(id: &str) -> Result<&str, ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::Empty);
    }
    if id.trim().is_empty() {
        return Err(ValidationError::WhitespaceOnly);
    }
    if id != id.trim() {
        return Err(ValidationError::LeadingTrailingWhitespace);
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(ValidationError::TooLong {
            length: id.len(),
            max: MAX_ID_LENGTH,
        });
    }
    if id.contains("../") || id.contains("./") {
        return Err(ValidationError::PathTraversal);
    }
    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ValidationError::InvalidCharacters);
    }
    Ok(id)
}

macro_rules! validated_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse and validate from a string.
            pub fn parse(id: impl AsRef<str>) -> Result<Self, ValidationError> {
                validate(id.as_ref()).map(|s| Self(s.to_string()))
            }

            /// Get the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Create without validation. Only for inputs that are known to
            /// be valid, e.g. literals in tests.
            #[doc(hidden)]
            pub fn new_unchecked(id: impl Into<String>) -> Self {
                Self(id.into())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

validated_id! {
    /// Stable name of a conversation participant, unique within a run.
    ///
    /// Used both for turn attribution in the transcript and for termination
    /// conditions scoped to a specific speaker.
    ParticipantName
}

validated_id! {
    /// Name of a tool advertised by a tool server.
    ToolName
}

/// Correlation id tying a tool-call request to exactly one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_names() {
        assert!(ParticipantName::parse("RestApiAgent").is_ok());
        assert!(ParticipantName::parse("db-agent_2").is_ok());
        assert!(ToolName::parse("filesystem.write_file").is_ok());
        assert!(ToolName::parse("a").is_ok());
    }

    #[test]
    fn rejects_invalid_names() {
        assert_eq!(ParticipantName::parse(""), Err(ValidationError::Empty));
        assert_eq!(
            ParticipantName::parse("   "),
            Err(ValidationError::WhitespaceOnly)
        );
        assert_eq!(
            ParticipantName::parse(" agent "),
            Err(ValidationError::LeadingTrailingWhitespace)
        );
        assert_eq!(
            ToolName::parse("tool with spaces"),
            Err(ValidationError::InvalidCharacters)
        );
        assert_eq!(
            ToolName::parse("../etc/passwd"),
            Err(ValidationError::PathTraversal)
        );
        assert!(matches!(
            ParticipantName::parse("a".repeat(129)),
            Err(ValidationError::TooLong { length: 129, .. })
        ));
    }

    #[test]
    fn max_length_is_accepted() {
        assert!(ParticipantName::parse("a".repeat(128)).is_ok());
    }

    #[test]
    fn serde_round_trip_validates() {
        let name: ParticipantName = serde_json::from_str("\"FileAgent\"").unwrap();
        assert_eq!(name.as_str(), "FileAgent");
        assert!(serde_json::from_str::<ParticipantName>("\"bad name\"").is_err());
    }

    #[test]
    fn correlation_ids_are_unique() {
        assert_ne!(CorrelationId::generate(), CorrelationId::generate());
    }
}
