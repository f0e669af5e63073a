//! Authenticated favorites and cart endpoint adapter.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::error::ClientResult;
use crate::domain::http_client::AuthHttpClient;
use crate::domain::ports::{ApiRequest, CartKey, ShoppingApi};
use crate::domain::shopping::CartItem;

use super::expect_success;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FavoriteDto {
    product_id: String,
}

/// Favorites and cart endpoint client over the authenticated HTTP client.
pub struct HttpShoppingApi {
    client: Arc<AuthHttpClient>,
}

impl HttpShoppingApi {
    /// Build a client over the authenticated HTTP client.
    #[must_use]
    pub fn new(client: Arc<AuthHttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ShoppingApi for HttpShoppingApi {
    async fn list_favorites(&self) -> ClientResult<Vec<String>> {
        let response = self.client.execute(ApiRequest::get("/api/favorites")).await?;
        let favorites: Vec<FavoriteDto> = expect_success(response)?.json()?;
        Ok(favorites
            .into_iter()
            .map(|favorite| favorite.product_id)
            .collect())
    }

    async fn set_favorite(&self, product_id: &str, favorited: bool) -> ClientResult<()> {
        let request = if favorited {
            ApiRequest::post(
                "/api/favorites",
                serde_json::json!({ "productId": product_id }),
            )
        } else {
            ApiRequest::delete(format!("/api/favorites/{product_id}"))
        };
        expect_success(self.client.execute(request).await?).map(|_| ())
    }

    async fn fetch_cart(&self) -> ClientResult<Vec<CartItem>> {
        let response = self.client.execute(ApiRequest::get("/api/cart")).await?;
        expect_success(response)?.json()
    }

    async fn upsert_cart_item(&self, item: &CartItem) -> ClientResult<()> {
        let request = ApiRequest::post("/api/cart/items", serde_json::json!(item));
        expect_success(self.client.execute(request).await?).map(|_| ())
    }

    async fn remove_cart_item(&self, key: &CartKey) -> ClientResult<()> {
        let mut request = ApiRequest::delete(format!("/api/cart/items/{}", key.product_id));
        if let Some(size) = &key.size {
            request = request.with_query("size", size);
        }
        expect_success(self.client.execute(request).await?).map(|_| ())
    }
}
