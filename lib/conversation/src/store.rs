//! In-memory session store.
//!
//! Sessions live for the lifetime of the process unless idle eviction is
//! enabled. Each session sits behind its own mutex: a [`SessionHandle`] holds
//! that lock until dropped, so requests for the same user are serialized
//! while different users proceed concurrently.

use crate::message::Message;
use crate::session::Session;
use chrono::{DateTime, Utc};
use persona_chat_core::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

#[derive(Debug)]
struct Slot {
    session: Session,
    retired: bool,
}

type SharedSlot = Arc<Mutex<Slot>>;

/// Process-wide mapping from user identifier to session.
#[derive(Debug, Default)]
pub struct SessionStore {
    slots: RwLock<HashMap<UserId, SharedSlot>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's session, creating it with the persona prompt as its
    /// sole message if absent. Waits for any in-flight request of the same
    /// user to finish.
    pub async fn get_or_create(&self, user_id: &UserId, persona_prompt: &str) -> SessionHandle {
        loop {
            let slot = self.slot(user_id, persona_prompt).await;
            let guard = slot.lock_owned().await;
            // Evicted between lookup and lock: start over with a fresh slot.
            if !guard.retired {
                return SessionHandle { guard };
            }
        }
    }

    async fn slot(&self, user_id: &UserId, persona_prompt: &str) -> SharedSlot {
        if let Some(slot) = self.slots.read().await.get(user_id) {
            return slot.clone();
        }

        let mut slots = self.slots.write().await;
        slots
            .entry(user_id.clone())
            .or_insert_with(|| {
                debug!(user_id = %user_id, "Creating session");
                Arc::new(Mutex::new(Slot {
                    session: Session::new(user_id.clone(), persona_prompt),
                    retired: false,
                }))
            })
            .clone()
    }

    /// Returns a copy of the user's session, if one exists.
    pub async fn snapshot(&self, user_id: &UserId) -> Option<Session> {
        let slot = self.slots.read().await.get(user_id).cloned()?;
        let guard = slot.lock().await;
        (!guard.retired).then(|| guard.session.clone())
    }

    /// Returns true if a session exists for the user.
    pub async fn contains(&self, user_id: &UserId) -> bool {
        self.slots.read().await.contains_key(user_id)
    }

    /// Returns the number of sessions.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Returns true if no session exists.
    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }

    /// Drops sessions idle since before `cutoff`. Sessions locked by an
    /// in-flight request are kept. Returns the number of evicted sessions.
    pub async fn evict_idle(&self, cutoff: DateTime<Utc>) -> usize {
        let mut slots = self.slots.write().await;
        let before = slots.len();

        slots.retain(|_, slot| match slot.try_lock() {
            Ok(mut guard) if guard.session.is_idle_since(cutoff) => {
                guard.retired = true;
                false
            }
            _ => true,
        });

        before - slots.len()
    }
}

/// Exclusive access to one user's session.
#[derive(Debug)]
pub struct SessionHandle {
    guard: OwnedMutexGuard<Slot>,
}

impl SessionHandle {
    /// Returns the current session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.guard.session
    }

    /// Replaces the whole session.
    pub fn replace(&mut self, session: Session) {
        self.guard.session = session;
    }

    /// Appends a message to the session.
    pub fn append(&mut self, message: Message) {
        self.guard.session.add_message(message);
    }
}
