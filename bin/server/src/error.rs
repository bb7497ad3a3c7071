//! Error types for the HTTP surface and startup.

use crate::types::ChatEnvelope;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use persona_chat_conversation::ConversationError;
use std::fmt;

/// Errors returned by the chat endpoint. Every variant renders as a
/// [`ChatEnvelope::Error`].
#[derive(Debug)]
pub enum ApiError {
    /// The body could not be extracted.
    InvalidBody { status: StatusCode, message: String },
    /// The message was blank.
    EmptyMessage,
    /// The completion call failed.
    Upstream {
        status: StatusCode,
        message: String,
        detail: String,
    },
}

impl ApiError {
    /// Maps a conversation error, showing `failure_message` for upstream
    /// failures.
    #[must_use]
    pub fn from_conversation(error: ConversationError, failure_message: &str) -> Self {
        match error {
            ConversationError::EmptyMessage => Self::EmptyMessage,
            ConversationError::Completion { .. } => {
                let status = error
                    .upstream_status()
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                Self::Upstream {
                    status,
                    message: failure_message.to_string(),
                    detail: error.to_string(),
                }
            }
        }
    }

    /// Returns the HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody { status, .. } | Self::Upstream { status, .. } => *status,
            Self::EmptyMessage => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::InvalidBody { message, .. } => {
                tracing::warn!(%status, "Rejected chat body: {}", message);
                message
            }
            Self::EmptyMessage => "No message provided.".to_string(),
            Self::Upstream {
                message, detail, ..
            } => {
                tracing::error!(%status, "Completion failed: {}", detail);
                message
            }
        };

        (status, Json(ChatEnvelope::error(message))).into_response()
    }
}

/// Errors that prevent the server from starting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// Configuration could not be loaded.
    Config { reason: String },
    /// No completion API key is configured.
    MissingApiKey,
    /// The completion backend could not be built.
    Backend { reason: String },
    /// The listing HTTP client could not be built.
    ListingClient,
    /// The listen address could not be bound.
    Bind { addr: String, reason: String },
    /// The server stopped with an error.
    Serve { reason: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { reason } => write!(f, "invalid configuration: {reason}"),
            Self::MissingApiKey => {
                write!(f, "OPENAI_API_KEY is not set")
            }
            Self::Backend { reason } => {
                write!(f, "failed to build completion backend: {reason}")
            }
            Self::ListingClient => write!(f, "failed to build listing http client"),
            Self::Bind { addr, reason } => {
                write!(f, "failed to bind to {addr}: {reason}")
            }
            Self::Serve { reason } => write!(f, "server error: {reason}"),
        }
    }
}

impl std::error::Error for StartupError {}
