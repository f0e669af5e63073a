//! Shopping cart with confirm-or-revert mutations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::error::{ClientResult, Error};
use crate::domain::ports::{CartKey, ShoppingApi};

use super::MutationOutcome;

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product identifier.
    pub product_id: String,
    /// Size variant, when the product has sizes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Number of units.
    pub quantity: u32,
}

impl CartItem {
    fn key(&self) -> CartKey {
        CartKey {
            product_id: self.product_id.clone(),
            size: self.size.clone(),
        }
    }
}

/// Client cache of the user's cart, eventually consistent with the server.
pub struct Cart {
    api: Arc<dyn ShoppingApi>,
    state: Mutex<HashMap<CartKey, CartItem>>,
}

impl Cart {
    /// Build an empty cart over the shopping endpoints.
    #[must_use]
    pub fn new(api: Arc<dyn ShoppingApi>) -> Self {
        Self {
            api,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Replace local state with the server's cart.
    pub async fn load(&self) -> ClientResult<()> {
        let items = self.api.fetch_cart().await?;
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::internal("cart state poisoned"))?;
        *state = items.into_iter().map(|item| (item.key(), item)).collect();
        Ok(())
    }

    /// Current cart lines in no particular order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.state
            .lock()
            .map(|state| state.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.state
            .lock()
            .map(|state| {
                state
                    .values()
                    .map(|item| u64::from(item.quantity))
                    .sum::<u64>()
            })
            .unwrap_or_default()
    }

    /// Insert or replace one cart line, optimistically.
    pub async fn put(&self, item: CartItem) -> MutationOutcome {
        let key = item.key();
        let previous = {
            let Ok(mut state) = self.state.lock() else {
                return MutationOutcome::Reverted(Error::internal("cart state poisoned"));
            };
            state.insert(key.clone(), item.clone())
        };

        match self.api.upsert_cart_item(&item).await {
            Ok(()) => MutationOutcome::Confirmed,
            Err(error) => {
                warn!(product_id = %key.product_id, error = %error, "cart update failed; reverting");
                self.restore(&key, previous);
                MutationOutcome::Reverted(error)
            }
        }
    }

    /// Remove one cart line, optimistically.
    pub async fn remove(&self, key: &CartKey) -> MutationOutcome {
        let previous = {
            let Ok(mut state) = self.state.lock() else {
                return MutationOutcome::Reverted(Error::internal("cart state poisoned"));
            };
            state.remove(key)
        };
        if previous.is_none() {
            return MutationOutcome::Confirmed;
        }

        match self.api.remove_cart_item(key).await {
            Ok(()) => MutationOutcome::Confirmed,
            Err(error) => {
                warn!(product_id = %key.product_id, error = %error, "cart removal failed; reverting");
                self.restore(key, previous);
                MutationOutcome::Reverted(error)
            }
        }
    }

    fn restore(&self, key: &CartKey, previous: Option<CartItem>) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        match previous {
            Some(item) => {
                state.insert(key.clone(), item);
            }
            None => {
                state.remove(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use crate::domain::ports::MockShoppingApi;

    use super::*;

    fn line(product_id: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: product_id.to_owned(),
            size: Some("M".to_owned()),
            quantity,
        }
    }

    #[tokio::test]
    async fn confirmed_put_keeps_the_line() {
        let mut api = MockShoppingApi::new();
        api.expect_upsert_cart_item().times(1).returning(|_| Ok(()));
        let cart = Cart::new(Arc::new(api));

        let outcome = cart.put(line("p1", 2)).await;

        assert!(outcome.is_confirmed());
        assert_eq!(cart.unit_count(), 2);
    }

    #[tokio::test]
    async fn failed_put_restores_the_previous_quantity() {
        let mut api = MockShoppingApi::new();
        api.expect_fetch_cart()
            .times(1)
            .returning(|| Ok(vec![line("p1", 1)]));
        api.expect_upsert_cart_item()
            .times(1)
            .returning(|_| Err(Error::transport("offline")));
        let cart = Cart::new(Arc::new(api));
        cart.load().await.expect("load cart");

        let outcome = cart.put(line("p1", 5)).await;

        assert!(!outcome.is_confirmed());
        assert_eq!(cart.items(), vec![line("p1", 1)]);
    }

    #[tokio::test]
    async fn failed_remove_reinserts_the_line() {
        let mut api = MockShoppingApi::new();
        api.expect_fetch_cart()
            .times(1)
            .returning(|| Ok(vec![line("p1", 3)]));
        api.expect_remove_cart_item()
            .times(1)
            .returning(|_| Err(Error::timeout("slow backend")));
        let cart = Cart::new(Arc::new(api));
        cart.load().await.expect("load cart");

        let key = line("p1", 3).key();
        let outcome = cart.remove(&key).await;

        assert!(!outcome.is_confirmed());
        assert_eq!(cart.unit_count(), 3);
    }

    #[tokio::test]
    async fn removing_an_absent_line_skips_the_server() {
        let mut api = MockShoppingApi::new();
        api.expect_remove_cart_item().never();
        let cart = Cart::new(Arc::new(api));

        let key = line("p1", 1).key();
        assert!(cart.remove(&key).await.is_confirmed());
    }
}
