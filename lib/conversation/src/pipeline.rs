//! The chat pipeline.
//!
//! One inbound turn flows through validation, the session store, the context
//! injector, the primary completion call and the response shaper. The stored
//! session only changes when the primary call succeeds.

use crate::error::ConversationError;
use crate::injector::ContextInjector;
use crate::message::Message;
use crate::persona::PersonaConfig;
use crate::shaping::shape;
use crate::store::SessionStore;
use persona_chat_ai::{LlmBackend, LlmProvider, LlmRequest};
use persona_chat_core::{RequestId, UserId};
use persona_chat_listing::PageFetcher;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// One inbound chat turn.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// The conversing user.
    pub user_id: UserId,
    /// The user's text.
    pub message: String,
    /// Optional listing page to pull context from.
    pub listing_url: Option<String>,
}

impl ChatTurn {
    /// Creates a turn without a listing URL.
    #[must_use]
    pub fn new(user_id: UserId, message: impl Into<String>) -> Self {
        Self {
            user_id,
            message: message.into(),
            listing_url: None,
        }
    }

    /// Attaches a listing URL. Blank URLs are ignored.
    #[must_use]
    pub fn with_listing_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        let url = url.trim();
        self.listing_url = (!url.is_empty()).then(|| url.to_string());
        self
    }
}

/// The result of a successful chat turn.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Identifies the turn in logs.
    pub request_id: RequestId,
    /// The shaped reply returned to the caller.
    pub reply: String,
    /// The raw generated text, as stored in the session.
    pub raw: String,
    /// Whether the session was compacted on this turn.
    pub compacted: bool,
    /// Whether listing context was injected on this turn.
    pub listing_injected: bool,
    /// Messages in the session after the turn.
    pub message_count: usize,
}

/// Handles chat turns against a shared session store.
pub struct ChatService {
    store: Arc<SessionStore>,
    injector: ContextInjector,
    backend: Arc<dyn LlmBackend>,
    persona: Arc<PersonaConfig>,
}

impl ChatService {
    /// Creates a service with an empty session store.
    #[must_use]
    pub fn new(
        persona: PersonaConfig,
        backend: Arc<dyn LlmBackend>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        let persona = Arc::new(persona);
        Self {
            store: Arc::new(SessionStore::new()),
            injector: ContextInjector::new(Arc::clone(&persona), fetcher, Arc::clone(&backend)),
            backend,
            persona,
        }
    }

    /// Returns the session store.
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Returns the persona configuration.
    #[must_use]
    pub fn persona(&self) -> &PersonaConfig {
        &self.persona
    }

    /// Returns the completion provider serving replies.
    #[must_use]
    pub fn provider(&self) -> LlmProvider {
        self.backend.provider()
    }

    /// Handles one chat turn.
    ///
    /// # Errors
    ///
    /// Returns `EmptyMessage` for blank input, before any session is touched,
    /// and `Completion` when the primary completion call fails. In both cases
    /// the stored session is unchanged.
    #[instrument(skip(self, turn), fields(user_id = %turn.user_id, persona = %self.persona.name))]
    pub async fn handle(&self, turn: ChatTurn) -> Result<ChatReply, ConversationError> {
        let text = turn.message.trim();
        if text.is_empty() {
            return Err(ConversationError::EmptyMessage);
        }

        let request_id = RequestId::new();
        let mut handle = self
            .store
            .get_or_create(&turn.user_id, &self.persona.system_prompt)
            .await;

        let mut staged = handle.session().clone();
        let prepared = self
            .injector
            .prepare(&mut staged, text, turn.listing_url.as_deref())
            .await;

        let mut request = LlmRequest::new(self.persona.model.clone(), prepared.messages)
            .with_temperature(self.persona.temperature);
        if let Some(options) = &self.persona.web_search {
            request = request.with_web_search(options.clone());
        }

        let response = match self.backend.generate(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!(%request_id, error = %e, "Reply generation failed");
                return Err(e.into());
            }
        };

        handle.replace(staged);
        handle.append(Message::assistant(response.content.clone()));
        let message_count = handle.session().message_count();
        drop(handle);

        info!(
            %request_id,
            message_count,
            compacted = prepared.compacted,
            listing_injected = prepared.listing_injected,
            tokens = response.usage.total(),
            "Reply generated"
        );

        Ok(ChatReply {
            request_id,
            reply: shape(self.persona.shaping, &response.content),
            raw: response.content,
            compacted: prepared.compacted,
            listing_injected: prepared.listing_injected,
            message_count,
        })
    }
}
