//! Authenticated notification endpoint adapter.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::ClientResult;
use crate::domain::feeds::NotificationItem;
use crate::domain::http_client::AuthHttpClient;
use crate::domain::ports::{ApiRequest, NotificationsApi};

use super::expect_success;

/// Notification endpoint client over the authenticated HTTP client.
pub struct HttpNotificationsApi {
    client: Arc<AuthHttpClient>,
}

impl HttpNotificationsApi {
    /// Build a client over the authenticated HTTP client.
    #[must_use]
    pub fn new(client: Arc<AuthHttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationsApi for HttpNotificationsApi {
    async fn list(&self) -> ClientResult<Vec<NotificationItem>> {
        let response = self.client.execute(ApiRequest::get("/api/notifications")).await?;
        expect_success(response)?.json()
    }

    async fn mark_read(&self, id: &str) -> ClientResult<()> {
        let request = ApiRequest::patch(
            format!("/api/notifications/{id}"),
            serde_json::json!({ "read": true }),
        );
        expect_success(self.client.execute(request).await?).map(|_| ())
    }

    async fn mark_all_read(&self) -> ClientResult<()> {
        let request =
            ApiRequest::patch("/api/notifications", serde_json::json!({ "read": true }));
        expect_success(self.client.execute(request).await?).map(|_| ())
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        let request = ApiRequest::delete(format!("/api/notifications/{id}"));
        expect_success(self.client.execute(request).await?).map(|_| ())
    }
}
