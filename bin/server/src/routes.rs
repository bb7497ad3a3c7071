//! HTTP routes.

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{ChatEnvelope, ChatRequest};
use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
};
use std::sync::Arc;

/// Liveness banner.
pub async fn home() -> &'static str {
    "persona-chat is running"
}

/// Handles one chat turn.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ChatPayload(request): ChatPayload,
) -> Result<Json<ChatEnvelope>, ApiError> {
    let reply = state
        .chat
        .handle(request.into_turn())
        .await
        .map_err(|e| ApiError::from_conversation(e, &state.chat.persona().failure_message))?;

    Ok(Json(ChatEnvelope::ok(reply.reply)))
}

/// Extractor for a chat body sent either as JSON or as a urlencoded form.
pub struct ChatPayload(pub ChatRequest);

impl<S> FromRequest<S> for ChatPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(body) = Form::<ChatRequest>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::InvalidBody {
                    status: rejection.status(),
                    message: rejection.body_text(),
                })?;
            Ok(Self(body))
        } else {
            let Json(body) = Json::<ChatRequest>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::InvalidBody {
                    status: rejection.status(),
                    message: rejection.body_text(),
                })?;
            Ok(Self(body))
        }
    }
}
