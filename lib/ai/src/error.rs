//! Error types for the AI crate.

use std::fmt;

/// Errors from LLM backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// The provider answered with a non-success HTTP status.
    UpstreamStatus { status: u16, body: String },
    /// The request could not be sent or the connection failed.
    RequestFailed { reason: String },
    /// Response parsing failed.
    ResponseParseFailed { reason: String },
    /// Timeout waiting for response.
    Timeout,
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl LlmError {
    /// Returns the upstream HTTP status, if the provider produced one.
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpstreamStatus { status, body } => {
                write!(f, "LLM provider returned HTTP {status}: {body}")
            }
            Self::RequestFailed { reason } => {
                write!(f, "LLM request failed: {reason}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse LLM response: {reason}")
            }
            Self::Timeout => write!(f, "LLM request timed out"),
            Self::InvalidConfig { reason } => {
                write!(f, "invalid LLM configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for LlmError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_display() {
        let err = LlmError::UpstreamStatus {
            status: 500,
            body: "internal error".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("internal error"));
        assert_eq!(err.upstream_status(), Some(500));
    }

    #[test]
    fn transport_errors_have_no_status() {
        assert_eq!(LlmError::Timeout.upstream_status(), None);
        let err = LlmError::RequestFailed {
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("connection refused"));
    }
}
