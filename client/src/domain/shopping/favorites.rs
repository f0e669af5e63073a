//! Favorite products with confirm-or-revert toggling.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::domain::error::{ClientResult, Error};
use crate::domain::ports::ShoppingApi;

use super::MutationOutcome;

/// Client cache of the user's favorited product ids.
pub struct Favorites {
    api: Arc<dyn ShoppingApi>,
    state: Mutex<HashSet<String>>,
}

impl Favorites {
    /// Build an empty favorites cache over the shopping endpoints.
    #[must_use]
    pub fn new(api: Arc<dyn ShoppingApi>) -> Self {
        Self {
            api,
            state: Mutex::new(HashSet::new()),
        }
    }

    /// Replace local state with the server's favorites list.
    pub async fn load(&self) -> ClientResult<()> {
        let ids = self.api.list_favorites().await?;
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::internal("favorites state poisoned"))?;
        *state = ids.into_iter().collect();
        Ok(())
    }

    /// Whether `product_id` is currently shown as favorited.
    #[must_use]
    pub fn is_favorited(&self, product_id: &str) -> bool {
        self.state
            .lock()
            .map(|state| state.contains(product_id))
            .unwrap_or_default()
    }

    /// Toggle the favorite flag for one product.
    ///
    /// The heart flips immediately; when the server call fails the flip is
    /// undone and the error is handed back for a toast.
    pub async fn toggle(&self, product_id: &str) -> MutationOutcome {
        let target = {
            let Ok(mut state) = self.state.lock() else {
                return MutationOutcome::Reverted(Error::internal("favorites state poisoned"));
            };
            let target = !state.contains(product_id);
            if target {
                state.insert(product_id.to_owned());
            } else {
                state.remove(product_id);
            }
            target
        };

        match self.api.set_favorite(product_id, target).await {
            Ok(()) => MutationOutcome::Confirmed,
            Err(error) => {
                warn!(product_id = %product_id, error = %error, "favorite toggle failed; reverting");
                if let Ok(mut state) = self.state.lock() {
                    if target {
                        state.remove(product_id);
                    } else {
                        state.insert(product_id.to_owned());
                    }
                }
                MutationOutcome::Reverted(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use crate::domain::ports::MockShoppingApi;

    use super::*;

    #[tokio::test]
    async fn confirmed_toggle_keeps_the_optimistic_state() {
        let mut api = MockShoppingApi::new();
        api.expect_set_favorite()
            .times(1)
            .returning(|_, _| Ok(()));
        let favorites = Favorites::new(Arc::new(api));

        let outcome = favorites.toggle("p1").await;

        assert!(outcome.is_confirmed());
        assert!(favorites.is_favorited("p1"));
    }

    #[tokio::test]
    async fn failed_toggle_reverts_the_heart() {
        let mut api = MockShoppingApi::new();
        api.expect_set_favorite()
            .times(1)
            .returning(|_, _| Err(Error::transport("offline")));
        let favorites = Favorites::new(Arc::new(api));

        let outcome = favorites.toggle("p1").await;

        let MutationOutcome::Reverted(error) = outcome else {
            panic!("expected a reverted outcome");
        };
        assert_eq!(error.code(), crate::domain::ErrorCode::Transport);
        assert!(!favorites.is_favorited("p1"));
    }

    #[tokio::test]
    async fn failed_unfavorite_restores_the_entry() {
        let mut api = MockShoppingApi::new();
        api.expect_list_favorites()
            .times(1)
            .returning(|| Ok(vec!["p1".to_owned()]));
        api.expect_set_favorite()
            .times(1)
            .returning(|_, _| Err(Error::timeout("slow backend")));
        let favorites = Favorites::new(Arc::new(api));
        favorites.load().await.expect("load favorites");

        let outcome = favorites.toggle("p1").await;

        assert!(!outcome.is_confirmed());
        assert!(favorites.is_favorited("p1"));
    }
}
