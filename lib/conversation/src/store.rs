//! In-memory session store keyed by caller.
//!
//! Each key owns its own [`ConversationSession`] behind its own mutex, so
//! messages for different callers run side by side while messages for the
//! same caller are applied one at a time.

use crate::error::DialogueError;
use crate::reply::OutboundReply;
use crate::session::ConversationSession;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Identifies whose dialogue a message belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey(String);

impl SessionKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for SessionKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Store behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Reject count answers without a number instead of re-asking.
    pub strict_counts: bool,
}

type SharedSession = Arc<Mutex<ConversationSession>>;

/// Owns every live reservation dialogue.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionKey, SharedSession>>,
    config: StoreConfig,
}

impl SessionStore {
    /// Creates an empty store with default behaviour.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Feeds a message into the session for `key`, creating it on first use.
    ///
    /// # Errors
    ///
    /// With `strict_counts` enabled, returns
    /// [`DialogueError::InvalidSlotValue`] for a count answer without a
    /// number. Otherwise never fails.
    pub async fn advance(
        &self,
        key: &SessionKey,
        user_text: &str,
        fulfillment_text: &str,
    ) -> Result<OutboundReply, DialogueError> {
        let entry = self.entry(key).await;
        let mut session = entry.lock().await;
        let before = session.state();

        let reply = if self.config.strict_counts {
            session.try_advance(user_text, fulfillment_text)?
        } else {
            session.advance(user_text, fulfillment_text)
        };

        let after = session.state();
        if after != before {
            debug!(session = %key, from = %before, to = %after, "dialogue advanced");
        }

        Ok(reply)
    }

    /// Returns a copy of the session for `key`, if one exists.
    pub async fn snapshot(&self, key: &SessionKey) -> Option<ConversationSession> {
        let entry = self.sessions.read().await.get(key).cloned()?;
        let session = entry.lock().await;
        Some(session.clone())
    }

    /// Drops the session for `key`. Returns true if one existed.
    pub async fn remove(&self, key: &SessionKey) -> bool {
        self.sessions.write().await.remove(key).is_some()
    }

    /// Drops sessions not touched since `older_than`.
    ///
    /// Sessions with a message in flight are kept regardless of age.
    /// Returns the number of sessions removed.
    pub async fn evict_idle(&self, older_than: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, entry| {
            // Handles only escape the map under the map lock, so a count of
            // one means nobody is holding or about to take this session.
            if Arc::strong_count(entry) > 1 {
                return true;
            }
            match entry.try_lock() {
                Ok(session) => session.last_active_at() >= older_than,
                Err(_) => true,
            }
        });

        before - sessions.len()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn entry(&self, key: &SessionKey) -> SharedSession {
        if let Some(entry) = self.sessions.read().await.get(key) {
            return Arc::clone(entry);
        }

        let mut sessions = self.sessions.write().await;
        let entry = sessions.entry(key.clone()).or_insert_with(|| {
            debug!(session = %key, "session created");
            Arc::new(Mutex::new(ConversationSession::new()))
        });
        Arc::clone(entry)
    }
}
