//! Message types for conversations.

use persona_chat_ai::{LlmMessage, MessageRole as LlmRole};
use serde::{Deserialize, Serialize};

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instruction or injected context.
    System,
    /// User/human message.
    User,
    /// Assistant/AI message.
    Assistant,
}

/// A message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: MessageRole,
    content: String,
}

impl Message {
    /// Creates a new message.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Returns the sender role.
    #[must_use]
    pub fn role(&self) -> MessageRole {
        self.role
    }

    /// Returns the message text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns true for system messages.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.role == MessageRole::System
    }
}

impl From<&Message> for LlmMessage {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            MessageRole::System => LlmRole::System,
            MessageRole::User => LlmRole::User,
            MessageRole::Assistant => LlmRole::Assistant,
        };
        LlmMessage::new(role, message.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_creation() {
        let msg = Message::user("Hello!");
        assert_eq!(msg.role(), MessageRole::User);
        assert_eq!(msg.content(), "Hello!");
        assert!(!msg.is_system());
        assert!(Message::system("rules").is_system());
    }

    #[test]
    fn converts_to_completion_message() {
        let llm: LlmMessage = (&Message::assistant("Hoi")).into();
        assert_eq!(llm, LlmMessage::assistant("Hoi"));
    }

    #[test]
    fn serializes_as_role_and_content() {
        let json = serde_json::to_value(Message::system("be brief")).expect("serialize");
        assert_eq!(json, serde_json::json!({"role": "system", "content": "be brief"}));
    }
}
