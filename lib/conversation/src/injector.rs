//! Context injection.
//!
//! Prepares a staged session for the primary completion call: listing
//! context, the new user turn, compaction at threshold boundaries and the
//! outbound message window.

use crate::message::Message;
use crate::persona::PersonaConfig;
use crate::session::{Session, SessionState};
use persona_chat_ai::{LlmBackend, LlmMessage, LlmRequest};
use persona_chat_listing::PageFetcher;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The outcome of preparing a session for a completion call.
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Messages to send upstream.
    pub messages: Vec<LlmMessage>,
    /// Whether listing context was injected on this turn.
    pub listing_injected: bool,
    /// Whether the session was compacted on this turn.
    pub compacted: bool,
}

/// Mutates sessions ahead of the primary completion call.
pub struct ContextInjector {
    persona: Arc<PersonaConfig>,
    fetcher: Arc<dyn PageFetcher>,
    backend: Arc<dyn LlmBackend>,
}

impl ContextInjector {
    /// Creates an injector.
    #[must_use]
    pub fn new(
        persona: Arc<PersonaConfig>,
        fetcher: Arc<dyn PageFetcher>,
        backend: Arc<dyn LlmBackend>,
    ) -> Self {
        Self {
            persona,
            fetcher,
            backend,
        }
    }

    /// Runs every injection step on `session` and returns the outbound
    /// messages. Listing and summarization failures are logged and skipped.
    pub async fn prepare(
        &self,
        session: &mut Session,
        text: &str,
        listing_url: Option<&str>,
    ) -> Prepared {
        let listing_injected = match listing_url {
            Some(url) => self.inject_listing(session, url).await,
            None => false,
        };

        session.add_message(self.user_message(text, listing_url));

        let compacted = if self.compaction_due(session.user_turns()) {
            self.compact(session).await
        } else {
            false
        };

        Prepared {
            messages: self.outbound(session),
            listing_injected,
            compacted,
        }
    }

    /// Fetches the listing and inserts its context after the first message,
    /// once per URL per session. Returns true if context was inserted.
    pub async fn inject_listing(&self, session: &mut Session, url: &str) -> bool {
        if session.has_listing(url) {
            debug!(url, "Listing already injected");
            return false;
        }

        match self.fetcher.fetch(url).await {
            Ok(record) => {
                session.insert_listing_context(url, Message::system(record.to_context()));
                info!(url, "Listing context injected");
                true
            }
            Err(report) => {
                warn!(url, error = ?report, "Listing fetch failed, continuing without it");
                false
            }
        }
    }

    /// Builds the user message for this turn.
    #[must_use]
    pub fn user_message(&self, text: &str, listing_url: Option<&str>) -> Message {
        let text = text.trim();
        match listing_url {
            Some(url) if self.persona.annotate_listing_url => {
                Message::user(format!("{text}\n\n(Listing: {url})"))
            }
            _ => Message::user(text),
        }
    }

    /// Returns true when `user_turns` crosses a compaction boundary.
    #[must_use]
    pub fn compaction_due(&self, user_turns: usize) -> bool {
        let threshold = self.persona.summarize_after_turns.max(1);
        user_turns > threshold && (user_turns - 1) % threshold == 0
    }

    /// Summarizes the history before the latest turn and rebuilds the
    /// session around the summary. Leaves the session untouched on failure.
    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    pub async fn compact(&self, session: &mut Session) -> bool {
        let messages = session.messages();
        let history = &messages[1..messages.len().saturating_sub(1).max(1)];

        let mut request_messages = Vec::with_capacity(history.len() + 2);
        request_messages.push(LlmMessage::system(self.persona.summary_instruction.clone()));
        if let Some(previous) = session.summary() {
            request_messages.push(LlmMessage::system(previous));
        }
        request_messages.extend(history.iter().map(LlmMessage::from));

        let request = LlmRequest::new(self.persona.model.clone(), request_messages)
            .with_temperature(self.persona.summary_temperature)
            .with_max_tokens(self.persona.summary_max_tokens);

        match self.backend.generate(&request).await {
            Ok(response) => {
                let head = Message::system(self.persona.summary_head(&response.content));
                session.compact(head, response.content.trim());
                info!(
                    compactions = session.compactions(),
                    messages = session.message_count(),
                    "Session compacted"
                );
                true
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed, keeping full history");
                false
            }
        }
    }

    /// Selects the messages sent upstream for the primary call.
    #[must_use]
    pub fn outbound(&self, session: &Session) -> Vec<LlmMessage> {
        let within_threshold = session.state() == SessionState::Active
            && session.user_turns() <= self.persona.summarize_after_turns;

        if within_threshold {
            session.messages().iter().map(LlmMessage::from).collect()
        } else {
            session
                .recent_window(self.persona.recent_window.max(1))
                .into_iter()
                .map(LlmMessage::from)
                .collect()
        }
    }
}
