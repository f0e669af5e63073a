//! Authenticated HTTP client with single-retry token refresh.
//!
//! Every authenticated call in the application goes through this client, so
//! the recover-from-401 logic exists in exactly one place. The recovery is
//! deliberately narrow: one refresh, one replay, and a second `401` ends the
//! session instead of looping.

use std::sync::Arc;

use tracing::debug;

use crate::domain::error::{ClientResult, Error};
use crate::domain::ports::{ApiRequest, ApiResponse, HttpGateway};
use crate::domain::session_store::SessionStore;

/// HTTP client attaching bearer credentials and recovering from expiry once.
pub struct AuthHttpClient {
    gateway: Arc<dyn HttpGateway>,
    store: Arc<SessionStore>,
}

impl AuthHttpClient {
    /// Build a client over the transport gateway and session store.
    #[must_use]
    pub fn new(gateway: Arc<dyn HttpGateway>, store: Arc<SessionStore>) -> Self {
        Self { gateway, store }
    }

    /// Execute `request` with the current access token.
    ///
    /// On a `401` the stored refresh token is exchanged once and the request
    /// replayed exactly once with the new access token.
    ///
    /// # Errors
    ///
    /// - [`crate::ErrorCode::AuthMissing`] when no session exists; the login
    ///   redirect fires without any network call.
    /// - [`crate::ErrorCode::AuthExpired`] when refresh fails or the replay
    ///   is rejected again; the session has been ended.
    /// - Timeout and transport failures map through unchanged and are never
    ///   retried here.
    pub async fn execute(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let Some((token, generation)) = self.store.bearer() else {
            self.store.force_logout("request without credentials").await;
            return Err(Error::auth_missing("no access token available"));
        };

        let response = self
            .gateway
            .execute(request.clone().with_bearer(&token))
            .await
            .map_err(Error::from)?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        debug!(path = %request.path, "request rejected with 401; attempting refresh");
        let fresh = self.store.refresh_after_unauthorized(generation).await?;

        let replay = self
            .gateway
            .execute(request.with_bearer(&fresh))
            .await
            .map_err(Error::from)?;
        if replay.is_unauthorized() {
            self.store.force_logout("replay rejected").await;
            return Err(Error::auth_expired("request rejected after refresh"));
        }
        Ok(replay)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use crate::domain::ErrorCode;
    use crate::domain::auth::Role;
    use crate::domain::ports::{InMemoryStateStore, RedirectTarget};
    use crate::test_support::api::{ScriptedAuthApi, ScriptedGateway};
    use crate::test_support::auth::{sample_profile, token_pair_expiring_in_secs};
    use crate::test_support::nav::RecordingNavigator;

    use super::*;

    struct Fixture {
        client: AuthHttpClient,
        gateway: Arc<ScriptedGateway>,
        auth: Arc<ScriptedAuthApi>,
        navigator: Arc<RecordingNavigator>,
        persistence: Arc<InMemoryStateStore>,
        store: Arc<SessionStore>,
    }

    async fn logged_in_fixture(gateway: ScriptedGateway, auth: ScriptedAuthApi) -> Fixture {
        let gateway = Arc::new(gateway);
        let auth = Arc::new(auth);
        let navigator = Arc::new(RecordingNavigator::default());
        let persistence = Arc::new(InMemoryStateStore::default());
        let store = Arc::new(SessionStore::new(
            auth.clone(),
            persistence.clone(),
            navigator.clone(),
        ));
        store
            .login(token_pair_expiring_in_secs(3_600), sample_profile(Role::Buyer))
            .await
            .expect("login succeeds");
        Fixture {
            client: AuthHttpClient::new(gateway.clone(), store.clone()),
            gateway,
            auth,
            navigator,
            persistence,
            store,
        }
    }

    fn ok_response() -> ApiResponse {
        ApiResponse {
            status: 200,
            body: br#"{"ok":true}"#.to_vec(),
        }
    }

    fn unauthorized_response() -> ApiResponse {
        ApiResponse {
            status: 401,
            body: Vec::new(),
        }
    }

    #[tokio::test]
    async fn passes_successful_responses_through() {
        let fixture = logged_in_fixture(
            ScriptedGateway::with_responses(vec![Ok(ok_response())]),
            ScriptedAuthApi::default(),
        )
        .await;

        let response = fixture
            .client
            .execute(ApiRequest::get("/api/orders"))
            .await
            .expect("request succeeds");

        assert_eq!(response.status, 200);
        assert_eq!(fixture.gateway.calls(), 1);
        assert_eq!(fixture.auth.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn one_unauthorized_triggers_one_refresh_and_one_replay() {
        let fixture = logged_in_fixture(
            ScriptedGateway::with_responses(vec![Ok(unauthorized_response()), Ok(ok_response())]),
            ScriptedAuthApi::with_refreshes(vec![Ok(token_pair_expiring_in_secs(7_200))]),
        )
        .await;

        let response = fixture
            .client
            .execute(ApiRequest::get("/api/notifications"))
            .await
            .expect("replay succeeds");

        assert_eq!(response.status, 200);
        assert_eq!(fixture.gateway.calls(), 2);
        assert_eq!(fixture.auth.refresh_calls(), 1);

        let bearers = fixture.gateway.bearers();
        assert_eq!(bearers.len(), 2);
        assert_ne!(bearers.first(), bearers.last());
    }

    #[tokio::test]
    async fn second_unauthorized_after_refresh_is_fatal() {
        let fixture = logged_in_fixture(
            ScriptedGateway::with_responses(vec![
                Ok(unauthorized_response()),
                Ok(unauthorized_response()),
            ]),
            ScriptedAuthApi::with_refreshes(vec![Ok(token_pair_expiring_in_secs(7_200))]),
        )
        .await;

        let error = fixture
            .client
            .execute(ApiRequest::get("/api/orders"))
            .await
            .expect_err("must fail");

        assert_eq!(error.code(), ErrorCode::AuthExpired);
        assert_eq!(fixture.auth.refresh_calls(), 1);
        assert!(fixture.store.snapshot().is_none());
        assert_eq!(fixture.navigator.redirects(), vec![RedirectTarget::Login]);
    }

    #[tokio::test]
    async fn refresh_failure_ends_the_session() {
        let fixture = logged_in_fixture(
            ScriptedGateway::with_responses(vec![Ok(unauthorized_response())]),
            ScriptedAuthApi::failing_refresh(),
        )
        .await;

        let error = fixture
            .client
            .execute(ApiRequest::get("/api/orders"))
            .await
            .expect_err("must fail");

        assert_eq!(error.code(), ErrorCode::AuthExpired);
        // No replay without a fresh token.
        assert_eq!(fixture.gateway.calls(), 1);
        assert_eq!(fixture.persistence.snapshot(), None);
        assert_eq!(fixture.navigator.redirects(), vec![RedirectTarget::Login]);
    }

    #[tokio::test]
    async fn missing_session_redirects_without_network() {
        let gateway = Arc::new(ScriptedGateway::with_responses(Vec::new()));
        let navigator = Arc::new(RecordingNavigator::default());
        let store = Arc::new(SessionStore::new(
            Arc::new(ScriptedAuthApi::default()),
            Arc::new(InMemoryStateStore::default()),
            navigator.clone(),
        ));
        let client = AuthHttpClient::new(gateway.clone(), store);

        let error = client
            .execute(ApiRequest::get("/api/orders"))
            .await
            .expect_err("must fail");

        assert_eq!(error.code(), ErrorCode::AuthMissing);
        assert_eq!(gateway.calls(), 0);
        assert_eq!(navigator.redirects(), vec![RedirectTarget::Login]);
    }

    #[tokio::test]
    async fn timeouts_surface_without_retry() {
        let fixture = logged_in_fixture(
            ScriptedGateway::timing_out(),
            ScriptedAuthApi::default(),
        )
        .await;

        let error = fixture
            .client
            .execute(ApiRequest::get("/api/orders"))
            .await
            .expect_err("must fail");

        assert_eq!(error.code(), ErrorCode::Timeout);
        assert_eq!(fixture.gateway.calls(), 1);
        assert_eq!(fixture.auth.refresh_calls(), 0);
    }
}
