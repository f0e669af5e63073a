//! Authenticated account endpoint adapter.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::UserProfile;
use crate::domain::error::ClientResult;
use crate::domain::http_client::AuthHttpClient;
use crate::domain::ports::{AccountApi, ApiRequest, ProfileUpdate};

use super::expect_success;

/// Account endpoint client over the authenticated HTTP client.
pub struct HttpAccountApi {
    client: Arc<AuthHttpClient>,
}

impl HttpAccountApi {
    /// Build a client over the authenticated HTTP client.
    #[must_use]
    pub fn new(client: Arc<AuthHttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccountApi for HttpAccountApi {
    async fn fetch_session(&self) -> ClientResult<UserProfile> {
        let response = self.client.execute(ApiRequest::get("/api/auth/session")).await?;
        expect_success(response)?.json()
    }

    async fn me(&self) -> ClientResult<UserProfile> {
        let response = self.client.execute(ApiRequest::get("/api/users/me")).await?;
        expect_success(response)?.json()
    }

    async fn update_me(&self, update: &ProfileUpdate) -> ClientResult<UserProfile> {
        let mut body = serde_json::Map::new();
        if let Some(name) = &update.name {
            body.insert("name".to_owned(), serde_json::json!(name));
        }
        if let Some(email) = &update.email {
            body.insert("email".to_owned(), serde_json::json!(email));
        }
        if let Some(role) = update.role {
            body.insert("role".to_owned(), serde_json::json!(role));
        }
        let request = ApiRequest::patch("/api/users/me", serde_json::Value::Object(body));
        expect_success(self.client.execute(request).await?)?.json()
    }

    async fn delete_account(&self) -> ClientResult<()> {
        let request = ApiRequest::post("/api/auth/delete-account", serde_json::json!({}));
        expect_success(self.client.execute(request).await?).map(|_| ())
    }
}
