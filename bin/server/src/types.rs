//! Request and response bodies of the HTTP surface.

use persona_chat_conversation::ChatTurn;
use persona_chat_core::UserId;
use serde::{Deserialize, Serialize};

/// Body of `POST /chat`, accepted as JSON or as a urlencoded form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    /// Conversing user; absent or blank means the default user.
    #[serde(default)]
    pub user_id: Option<String>,
    /// The user's text.
    #[serde(default)]
    pub message: String,
    /// Optional listing page.
    #[serde(default, alias = "woning_url")]
    pub url: Option<String>,
}

impl ChatRequest {
    /// Converts the body into a chat turn.
    #[must_use]
    pub fn into_turn(self) -> ChatTurn {
        let turn = ChatTurn::new(UserId::from_optional(self.user_id.as_deref()), self.message);
        match self.url {
            Some(url) => turn.with_listing_url(url),
            None => turn,
        }
    }
}

/// The single response envelope for every outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChatEnvelope {
    /// `{"status":"ok","response":...}`
    Ok {
        /// The shaped reply.
        response: String,
    },
    /// `{"status":"error","error":...}`
    Error {
        /// A user-facing error message.
        error: String,
    },
}

impl ChatEnvelope {
    /// Wraps a successful reply.
    #[must_use]
    pub fn ok(response: impl Into<String>) -> Self {
        Self::Ok {
            response: response.into(),
        }
    }

    /// Wraps an error message.
    #[must_use]
    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_shapes() {
        assert_eq!(
            serde_json::to_value(ChatEnvelope::ok("Hallo")).expect("serialize"),
            json!({"status": "ok", "response": "Hallo"})
        );
        assert_eq!(
            serde_json::to_value(ChatEnvelope::error("Mislukt")).expect("serialize"),
            json!({"status": "error", "error": "Mislukt"})
        );
    }

    #[test]
    fn request_accepts_legacy_url_field() {
        let request: ChatRequest = serde_json::from_value(json!({
            "message": "Prijs?",
            "woning_url": "https://listings.test/1"
        }))
        .expect("deserialize");

        let turn = request.into_turn();
        assert!(turn.user_id.is_default());
        assert_eq!(turn.listing_url.as_deref(), Some("https://listings.test/1"));
    }

    #[test]
    fn blank_url_is_dropped() {
        let request = ChatRequest {
            user_id: Some("u1".to_string()),
            message: "Hoi".to_string(),
            url: Some(" ".to_string()),
        };

        let turn = request.into_turn();
        assert_eq!(turn.user_id.as_str(), "u1");
        assert_eq!(turn.listing_url, None);
    }
}
