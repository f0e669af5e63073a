//! File-backed client state store.
//!
//! The desktop counterpart of the browser's persistent storage: one JSON
//! file holding the credential fields and the search history. Opened
//! through a capability-scoped directory handle so the adapter can only
//! touch its own state directory.

use std::path::Path;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::auth::{Role, UserProfile};
use crate::domain::ports::{
    PersistedSession, SearchHistoryPersistence, SessionPersistence, StateStoreError,
};

const STATE_FILE: &str = "client-state.json";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StateFile {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<UserProfile>,
    role: Option<Role>,
    user_id: Option<String>,
    search_history: Vec<String>,
}

/// State store writing one JSON file inside a scoped directory.
pub struct FileStateStore {
    dir: Dir,
}

impl FileStateStore {
    /// Open the store rooted at `root`, which must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError::Load`] when the directory cannot be
    /// opened.
    pub fn open(root: &Path) -> Result<Self, StateStoreError> {
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|error| StateStoreError::load(format!("open {}: {error}", root.display())))?;
        Ok(Self { dir })
    }

    fn read_state(&self) -> Result<StateFile, StateStoreError> {
        let bytes = match self.dir.read(STATE_FILE) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StateFile::default());
            }
            Err(error) => return Err(StateStoreError::load(error.to_string())),
        };
        match serde_json::from_slice(&bytes) {
            Ok(state) => Ok(state),
            Err(error) => {
                // A corrupt file behaves like an empty one; the user logs in
                // again instead of being locked out of startup.
                warn!(error = %error, "state file is corrupt; starting empty");
                Ok(StateFile::default())
            }
        }
    }

    fn write_state(&self, state: &StateFile) -> Result<(), StateStoreError> {
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|error| StateStoreError::store(error.to_string()))?;
        self.dir
            .write(STATE_FILE, bytes)
            .map_err(|error| StateStoreError::store(error.to_string()))
    }
}

#[async_trait]
impl SessionPersistence for FileStateStore {
    async fn load(&self) -> Result<Option<PersistedSession>, StateStoreError> {
        let state = self.read_state()?;
        let (Some(access_token), Some(refresh_token), Some(user)) =
            (state.access_token, state.refresh_token, state.user)
        else {
            return Ok(None);
        };
        Ok(Some(PersistedSession {
            access_token,
            refresh_token,
            user,
        }))
    }

    async fn store(&self, snapshot: &PersistedSession) -> Result<(), StateStoreError> {
        let mut state = self.read_state()?;
        state.access_token = Some(snapshot.access_token.clone());
        state.refresh_token = Some(snapshot.refresh_token.clone());
        state.role = Some(snapshot.user.role());
        state.user_id = Some(snapshot.user.id().to_string());
        state.user = Some(snapshot.user.clone());
        self.write_state(&state)
    }

    async fn clear(&self) -> Result<(), StateStoreError> {
        let mut state = self.read_state()?;
        state.access_token = None;
        state.refresh_token = None;
        state.user = None;
        state.role = None;
        state.user_id = None;
        self.write_state(&state)
    }
}

#[async_trait]
impl SearchHistoryPersistence for FileStateStore {
    async fn load_history(&self) -> Result<Vec<String>, StateStoreError> {
        Ok(self.read_state()?.search_history)
    }

    async fn store_history(&self, entries: &[String]) -> Result<(), StateStoreError> {
        let mut state = self.read_state()?;
        state.search_history = entries.to_vec();
        self.write_state(&state)
    }
}
