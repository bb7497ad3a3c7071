//! Error types for the conversation crate.

use persona_chat_ai::LlmError;
use std::fmt;

/// Errors from handling a chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// The user message is empty after trimming.
    EmptyMessage,
    /// The completion call for the reply failed.
    Completion { source: LlmError },
}

impl ConversationError {
    /// Returns the upstream HTTP status to pass through, if any.
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::EmptyMessage => None,
            Self::Completion { source } => source.upstream_status(),
        }
    }
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "message must not be empty"),
            Self::Completion { source } => write!(f, "reply generation failed: {source}"),
        }
    }
}

impl std::error::Error for ConversationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EmptyMessage => None,
            Self::Completion { source } => Some(source),
        }
    }
}

impl From<LlmError> for ConversationError {
    fn from(source: LlmError) -> Self {
        Self::Completion { source }
    }
}
