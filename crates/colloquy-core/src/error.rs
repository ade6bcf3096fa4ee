//! Validation errors shared by the identifier types.

use thiserror::Error;

/// Maximum length for all identifier types.
pub const MAX_ID_LENGTH: usize = 128;

/// Error type for identifier validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The identifier string is empty.
    #[error("identifier cannot be empty")]
    Empty,
    /// The identifier contains only whitespace.
    #[error("identifier cannot be whitespace-only")]
    WhitespaceOnly,
    /// The identifier has leading or trailing whitespace.
    #[error("identifier cannot have leading or trailing whitespace")]
    LeadingTrailingWhitespace,
    /// The identifier contains characters outside `[A-Za-z0-9._-]`.
    #[error("identifier can only contain alphanumeric characters, hyphens, underscores, and dots")]
    InvalidCharacters,
    /// The identifier exceeds the maximum length.
    #[error("identifier too long ({length} chars, max {max})")]
    TooLong { length: usize, max: usize },
    /// The identifier contains path traversal sequences.
    #[error("identifier cannot contain path traversal sequences (../)")]
    PathTraversal,
}
