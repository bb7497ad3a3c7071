//! Chat-completion client for persona-chat.
//!
//! This crate provides the boundary to the external text-generation service:
//!
//! - **Backend trait**: `LlmBackend`, a single-shot completion over an
//!   ordered, role-tagged message list
//! - **OpenAI backend**: an implementation against OpenAI-compatible
//!   `chat/completions` endpoints

pub mod backend;
pub mod error;
pub mod openai;

pub use backend::{
    LlmBackend, LlmBackendConfig, LlmMessage, LlmProvider, LlmRequest, LlmResponse, MessageRole,
    TokenUsage, WebSearchOptions,
};
pub use error::LlmError;
pub use openai::OpenAiBackend;
