//! Conversation state and context injection for persona-chat.
//!
//! This crate provides:
//!
//! - **Session Store**: per-user transcripts with same-user serialization
//! - **Context Injector**: listing context, compaction and outbound windows
//! - **Response Shaper**: presentation of generated text
//! - **Chat pipeline**: `ChatService`, which ties the above to a completion
//!   backend with commit-on-success semantics

pub mod error;
pub mod injector;
pub mod message;
pub mod persona;
pub mod pipeline;
pub mod session;
pub mod shaping;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::ConversationError;
pub use injector::{ContextInjector, Prepared};
pub use message::{Message, MessageRole};
pub use persona::{PersonaConfig, PersonaPreset};
pub use pipeline::{ChatReply, ChatService, ChatTurn};
pub use session::{Session, SessionState};
pub use shaping::{ShapingMode, shape};
pub use store::{SessionHandle, SessionStore};
