//! Persisted client state ports.
//!
//! The embedding runtime owns where state lives (a browser would use local
//! storage; the desktop client uses a file). The domain only sees these two
//! traits, which keeps refresh and logout atomic from the perspective of any
//! reader.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::auth::UserProfile;

/// Credential snapshot as written to persistent storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSession {
    /// Raw access token string.
    pub access_token: String,
    /// Raw refresh token string.
    pub refresh_token: String,
    /// Authenticated profile, including role and user id.
    pub user: UserProfile,
}

/// Errors raised by state storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateStoreError {
    /// Reading persisted state failed.
    #[error("failed to load persisted state: {message}")]
    Load {
        /// Adapter failure detail.
        message: String,
    },
    /// Writing persisted state failed.
    #[error("failed to store persisted state: {message}")]
    Store {
        /// Adapter failure detail.
        message: String,
    },
}

impl StateStoreError {
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}

/// Port persisting the credential snapshot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionPersistence: Send + Sync {
    /// Load the stored snapshot, if any.
    async fn load(&self) -> Result<Option<PersistedSession>, StateStoreError>;

    /// Replace the stored snapshot.
    async fn store(&self, snapshot: &PersistedSession) -> Result<(), StateStoreError>;

    /// Remove every credential field.
    async fn clear(&self) -> Result<(), StateStoreError>;
}

/// Port persisting the search history list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchHistoryPersistence: Send + Sync {
    /// Load stored history, most recent first.
    async fn load_history(&self) -> Result<Vec<String>, StateStoreError>;

    /// Replace stored history.
    async fn store_history(&self, entries: &[String]) -> Result<(), StateStoreError>;
}

/// In-memory fixture implementing both persistence ports.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    session: Mutex<Option<PersistedSession>>,
    history: Mutex<Vec<String>>,
}

impl InMemoryStateStore {
    /// Fixture preloaded with a snapshot.
    #[must_use]
    pub fn with_session(snapshot: PersistedSession) -> Self {
        Self {
            session: Mutex::new(Some(snapshot)),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Current snapshot, for assertions.
    #[must_use]
    pub fn snapshot(&self) -> Option<PersistedSession> {
        self.session
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SessionPersistence for InMemoryStateStore {
    async fn load(&self) -> Result<Option<PersistedSession>, StateStoreError> {
        self.session
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| StateStoreError::load("state mutex poisoned"))
    }

    async fn store(&self, snapshot: &PersistedSession) -> Result<(), StateStoreError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| StateStoreError::store("state mutex poisoned"))?;
        *guard = Some(snapshot.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StateStoreError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| StateStoreError::store("state mutex poisoned"))?;
        *guard = None;
        Ok(())
    }
}

#[async_trait]
impl SearchHistoryPersistence for InMemoryStateStore {
    async fn load_history(&self) -> Result<Vec<String>, StateStoreError> {
        self.history
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| StateStoreError::load("history mutex poisoned"))
    }

    async fn store_history(&self, entries: &[String]) -> Result<(), StateStoreError> {
        let mut guard = self
            .history
            .lock()
            .map_err(|_| StateStoreError::store("history mutex poisoned"))?;
        *guard = entries.to_vec();
        Ok(())
    }
}
