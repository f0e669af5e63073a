//! Authenticated favorites and cart endpoints port.

use async_trait::async_trait;

use crate::domain::error::ClientResult;
use crate::domain::shopping::CartItem;

/// Identity of one cart line: a product plus its optional size variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartKey {
    /// Product identifier.
    pub product_id: String,
    /// Size variant, when the product has sizes.
    pub size: Option<String>,
}

/// Port for the authenticated favorites and cart endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShoppingApi: Send + Sync {
    /// Fetch the product ids currently favorited by the user.
    async fn list_favorites(&self) -> ClientResult<Vec<String>>;

    /// Set the favorite flag for one product.
    async fn set_favorite(&self, product_id: &str, favorited: bool) -> ClientResult<()>;

    /// Fetch the server's view of the cart.
    async fn fetch_cart(&self) -> ClientResult<Vec<CartItem>>;

    /// Insert or replace one cart line.
    async fn upsert_cart_item(&self, item: &CartItem) -> ClientResult<()>;

    /// Remove one cart line.
    async fn remove_cart_item(&self, key: &CartKey) -> ClientResult<()>;
}
