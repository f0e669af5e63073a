//! Recent search terms, most recent first.

use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::domain::error::{ClientResult, Error};
use crate::domain::ports::SearchHistoryPersistence;

/// Maximum number of remembered search terms.
pub const SEARCH_HISTORY_CAP: usize = 5;

/// Most-recent-first search history with bounded length.
///
/// ## Invariants
/// - No duplicate entries; recording an existing term moves it to the front.
/// - At most [`SEARCH_HISTORY_CAP`] entries.
/// - Entries are trimmed and never blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHistory {
    entries: Vec<String>,
}

impl SearchHistory {
    /// Rebuild a history from persisted entries, enforcing the invariants.
    #[must_use]
    pub fn from_entries(raw: impl IntoIterator<Item = String>) -> Self {
        let mut history = Self::default();
        let collected: Vec<String> = raw.into_iter().collect();
        // Recording in reverse keeps the persisted most-recent-first order.
        for term in collected.into_iter().rev() {
            history.record(&term);
        }
        history
    }

    /// Record one search term at the front.
    pub fn record(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }
        self.entries.retain(|entry| entry != term);
        self.entries.insert(0, term.to_owned());
        self.entries.truncate(SEARCH_HISTORY_CAP);
    }

    /// Entries, most recent first.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        self.entries.as_slice()
    }
}

/// Search history backed by persistent storage.
pub struct SearchHistoryService {
    persistence: Arc<dyn SearchHistoryPersistence>,
    state: Mutex<SearchHistory>,
}

impl SearchHistoryService {
    /// Build an empty service; call [`Self::load`] before first use.
    #[must_use]
    pub fn new(persistence: Arc<dyn SearchHistoryPersistence>) -> Self {
        Self {
            persistence,
            state: Mutex::new(SearchHistory::default()),
        }
    }

    /// Load persisted history, sanitising whatever was stored.
    pub async fn load(&self) -> ClientResult<()> {
        let raw = self
            .persistence
            .load_history()
            .await
            .map_err(|error| Error::internal(error.to_string()))?;
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::internal("search history state poisoned"))?;
        *state = SearchHistory::from_entries(raw);
        Ok(())
    }

    /// Record a search and persist the updated history.
    pub async fn record(&self, term: &str) -> ClientResult<Vec<String>> {
        let entries = {
            let mut state = self
                .state
                .lock()
                .map_err(|_| Error::internal("search history state poisoned"))?;
            state.record(term);
            state.entries().to_vec()
        };
        if let Err(error) = self.persistence.store_history(&entries).await {
            // History is a convenience; a failed write must not break search.
            warn!(error = %error, "failed to persist search history");
        }
        Ok(entries)
    }

    /// Current entries, most recent first.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.entries().to_vec())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use crate::domain::ports::InMemoryStateStore;

    use super::*;

    #[test]
    fn new_terms_go_to_the_front() {
        let mut history = SearchHistory::from_entries(["chair".to_owned(), "vase".to_owned()]);
        history.record("lamp");
        assert_eq!(history.entries(), ["lamp", "chair", "vase"]);
    }

    #[test]
    fn repeated_terms_move_to_the_front_without_duplicating() {
        let mut history = SearchHistory::from_entries(["chair".to_owned(), "vase".to_owned()]);
        history.record("chair");
        assert_eq!(history.entries(), ["chair", "vase"]);
    }

    #[test]
    fn history_is_capped() {
        let mut history = SearchHistory::default();
        for term in ["a", "b", "c", "d", "e", "f"] {
            history.record(term);
        }
        assert_eq!(history.entries(), ["f", "e", "d", "c", "b"]);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_terms_are_ignored(#[case] term: &str) {
        let mut history = SearchHistory::from_entries(["vase".to_owned()]);
        history.record(term);
        assert_eq!(history.entries(), ["vase"]);
    }

    #[test]
    fn terms_are_trimmed() {
        let mut history = SearchHistory::default();
        history.record("  lamp  ");
        assert_eq!(history.entries(), ["lamp"]);
    }

    #[tokio::test]
    async fn service_round_trips_through_persistence() {
        let store = Arc::new(InMemoryStateStore::default());
        let service = SearchHistoryService::new(store.clone());

        service.record("chair").await.expect("record");
        service.record("lamp").await.expect("record");

        let reloaded = SearchHistoryService::new(store);
        reloaded.load().await.expect("load");
        assert_eq!(reloaded.entries(), vec!["lamp".to_owned(), "chair".to_owned()]);
    }
}
