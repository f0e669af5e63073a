//! Authenticated order endpoint adapter.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::ClientResult;
use crate::domain::feeds::OrderSummaryItem;
use crate::domain::http_client::AuthHttpClient;
use crate::domain::ports::{ApiRequest, OrdersApi};

use super::expect_success;

/// Order endpoint client over the authenticated HTTP client.
pub struct HttpOrdersApi {
    client: Arc<AuthHttpClient>,
}

impl HttpOrdersApi {
    /// Build a client over the authenticated HTTP client.
    #[must_use]
    pub fn new(client: Arc<AuthHttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrdersApi for HttpOrdersApi {
    async fn list(&self) -> ClientResult<Vec<OrderSummaryItem>> {
        let response = self.client.execute(ApiRequest::get("/api/orders")).await?;
        expect_success(response)?.json()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use crate::domain::auth::Role;
    use crate::domain::feeds::OrderStatus;
    use crate::domain::ports::{ApiResponse, InMemoryStateStore};
    use crate::domain::session_store::SessionStore;
    use crate::test_support::api::{ScriptedAuthApi, ScriptedGateway};
    use crate::test_support::auth::{sample_profile, token_pair_expiring_in_secs};
    use crate::test_support::nav::RecordingNavigator;

    use super::*;

    #[tokio::test]
    async fn list_decodes_the_order_payload() {
        let body = r#"[{
            "id": "o1",
            "product": "Cork stool",
            "price": 75.0,
            "status": "Delivered",
            "createdAt": "2026-02-01T08:00:00Z"
        }]"#;
        let gateway = Arc::new(ScriptedGateway::with_responses(vec![Ok(ApiResponse {
            status: 200,
            body: body.as_bytes().to_vec(),
        })]));
        let store = Arc::new(SessionStore::new(
            Arc::new(ScriptedAuthApi::default()),
            Arc::new(InMemoryStateStore::default()),
            Arc::new(RecordingNavigator::default()),
        ));
        store
            .login(token_pair_expiring_in_secs(3_600), sample_profile(Role::Buyer))
            .await
            .expect("login succeeds");
        let api = HttpOrdersApi::new(Arc::new(AuthHttpClient::new(gateway.clone(), store)));

        let orders = api.list().await.expect("list succeeds");

        assert_eq!(orders.len(), 1);
        let order = orders.first().expect("one order");
        assert_eq!(order.status, OrderStatus::Delivered);
        let bearers = gateway.bearers();
        assert!(bearers.first().is_some_and(Option::is_some));
    }
}
