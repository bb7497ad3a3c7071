//! Conversation sessions.
//!
//! A session is the ordered transcript sent upstream for one user. Its first
//! message is always a system message: the persona prompt, or after a
//! compaction the persona prompt merged with the running summary.

use crate::message::{Message, MessageRole};
use chrono::{DateTime, Utc};
use persona_chat_core::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// First message plus at most one listing context.
pub const MAX_HEAD_MESSAGES: usize = 2;

/// The state of a conversation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Accumulating turns, never compacted.
    Active,
    /// Accumulating turns after at least one compaction.
    Compacted,
}

/// A conversation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    user_id: UserId,
    state: SessionState,
    messages: Vec<Message>,
    injected_listings: BTreeSet<String>,
    summary: Option<String>,
    compactions: u32,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session whose sole message is the persona prompt.
    #[must_use]
    pub fn new(user_id: UserId, persona_prompt: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            state: SessionState::Active,
            messages: vec![Message::system(persona_prompt)],
            injected_listings: BTreeSet::new(),
            summary: None,
            compactions: 0,
            created_at: now,
            last_active_at: now,
        }
    }

    /// Returns the owning user.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the transcript.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns the last message, if any.
    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the latest summary, if the session was compacted.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Returns how many compactions have run.
    #[must_use]
    pub fn compactions(&self) -> u32 {
        self.compactions
    }

    /// When the session was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the session was last modified.
    #[must_use]
    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    /// Counts user messages in the transcript.
    #[must_use]
    pub fn user_turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role() == MessageRole::User)
            .count()
    }

    /// Number of system messages at the head of the transcript.
    #[must_use]
    pub fn leading_system_count(&self) -> usize {
        self.messages.iter().take_while(|m| m.is_system()).count()
    }

    /// Returns true if context for this listing URL was already injected.
    #[must_use]
    pub fn has_listing(&self, url: &str) -> bool {
        self.injected_listings.contains(url)
    }

    /// Appends a message.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    /// Inserts listing context right after the first system message and
    /// remembers the URL.
    pub fn insert_listing_context(&mut self, url: impl Into<String>, context: Message) {
        self.messages.insert(1, context);
        self.injected_listings.insert(url.into());
        self.touch();
    }

    /// Replaces the transcript with a fresh head message, the most recent
    /// listing context and the most recent user turn. Older listing contexts
    /// are dropped; their URLs stay recorded so they are not fetched again.
    pub fn compact(&mut self, head: Message, summary: impl Into<String>) {
        let latest_listing = self.latest_listing_context().cloned();
        let latest_turn = self
            .messages
            .last()
            .filter(|m| m.role() == MessageRole::User)
            .cloned();

        let mut messages = Vec::with_capacity(MAX_HEAD_MESSAGES + 1);
        messages.push(head);
        messages.extend(latest_listing);
        messages.extend(latest_turn);

        self.messages = messages;
        self.summary = Some(summary.into());
        self.compactions += 1;
        self.state = SessionState::Compacted;
        self.touch();
    }

    /// The most recently injected listing context, if any. Listing contexts
    /// are inserted right after the first message, so the newest sits at
    /// index 1.
    #[must_use]
    pub fn latest_listing_context(&self) -> Option<&Message> {
        if self.leading_system_count() > 1 {
            self.messages.get(1)
        } else {
            None
        }
    }

    /// The first message, the most recent listing context and the last
    /// `recent` conversational messages. Older listing contexts are left out.
    #[must_use]
    pub fn recent_window(&self, recent: usize) -> Vec<&Message> {
        let leading = self.leading_system_count();
        let head = leading.min(MAX_HEAD_MESSAGES);
        let tail = &self.messages[leading..];
        let start = tail.len().saturating_sub(recent);

        self.messages[..head]
            .iter()
            .chain(tail[start..].iter())
            .collect()
    }

    /// Returns true if the session has not changed since `cutoff`.
    #[must_use]
    pub fn is_idle_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_active_at < cutoff
    }

    fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(UserId::new("u1"), "You are a real-estate advisor.")
    }

    #[test]
    fn session_creation() {
        let session = session();

        assert_eq!(session.user_id().as_str(), "u1");
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.message_count(), 1);
        assert_eq!(
            session.messages()[0],
            Message::system("You are a real-estate advisor.")
        );
        assert_eq!(session.compactions(), 0);
    }

    #[test]
    fn session_add_message() {
        let mut session = session();
        session.add_message(Message::user("Hello!"));

        assert_eq!(session.message_count(), 2);
        assert_eq!(session.last_message().map(Message::content), Some("Hello!"));
        assert_eq!(session.user_turns(), 1);
    }

    #[test]
    fn listing_context_goes_after_first_message() {
        let mut session = session();
        session.add_message(Message::user("Hoi"));
        session.insert_listing_context("https://x.test/1", Message::system("listing 1"));

        assert_eq!(session.messages()[1], Message::system("listing 1"));
        assert_eq!(session.leading_system_count(), 2);
        assert!(session.has_listing("https://x.test/1"));
        assert!(!session.has_listing("https://x.test/2"));
    }

    #[test]
    fn compaction_keeps_head_context_and_latest_turn() {
        let mut session = session();
        session.insert_listing_context("https://x.test/1", Message::system("listing 1"));
        for i in 0..4 {
            session.add_message(Message::user(format!("q{i}")));
            session.add_message(Message::assistant(format!("a{i}")));
        }
        session.add_message(Message::user("latest"));

        session.compact(Message::system("persona + summary"), "summary");

        assert_eq!(
            session.messages(),
            &[
                Message::system("persona + summary"),
                Message::system("listing 1"),
                Message::user("latest"),
            ]
        );
        assert_eq!(session.state(), SessionState::Compacted);
        assert_eq!(session.summary(), Some("summary"));
        assert_eq!(session.compactions(), 1);
        assert!(session.has_listing("https://x.test/1"));
    }

    #[test]
    fn recent_window_is_bounded() {
        let mut session = session();
        for i in 0..10 {
            session.add_message(Message::user(format!("q{i}")));
            session.add_message(Message::assistant(format!("a{i}")));
        }

        let window = session.recent_window(5);

        assert_eq!(window.len(), 6);
        assert!(window[0].is_system());
        assert_eq!(window[1].content(), "a7");
        assert_eq!(window[5].content(), "a9");
    }

    #[test]
    fn recent_window_of_short_session_is_whole_session() {
        let mut session = session();
        session.add_message(Message::user("q"));
        assert_eq!(session.recent_window(5).len(), 2);
    }

    #[test]
    fn compaction_keeps_only_newest_listing_context() {
        let mut session = session();
        for i in 0..3 {
            session.insert_listing_context(
                format!("https://x.test/{i}"),
                Message::system(format!("listing {i}")),
            );
            session.add_message(Message::user(format!("q{i}")));
        }

        session.compact(Message::system("persona + summary"), "summary");

        assert_eq!(
            session.messages(),
            &[
                Message::system("persona + summary"),
                Message::system("listing 2"),
                Message::user("q2"),
            ]
        );
        assert!(session.has_listing("https://x.test/0"));
    }

    #[test]
    fn recent_window_skips_older_listing_contexts() {
        let mut session = session();
        for i in 0..8 {
            session.insert_listing_context(
                format!("https://x.test/{i}"),
                Message::system(format!("listing {i}")),
            );
            session.add_message(Message::user(format!("q{i}")));
            session.add_message(Message::assistant(format!("a{i}")));
        }

        let window = session.recent_window(5);

        assert_eq!(window.len(), MAX_HEAD_MESSAGES + 5);
        assert_eq!(window[1].content(), "listing 7");
        assert!(window[2..].iter().all(|m| !m.is_system()));
        assert_eq!(session.latest_listing_context().map(Message::content), Some("listing 7"));
    }

    #[test]
    fn idle_detection() {
        let session = session();
        assert!(session.is_idle_since(Utc::now() + chrono::Duration::seconds(1)));
        assert!(!session.is_idle_since(session.created_at() - chrono::Duration::seconds(1)));
    }
}
