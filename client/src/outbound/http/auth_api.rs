//! Unauthenticated auth endpoint adapter.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::TokenPair;
use crate::domain::error::{ClientResult, Error};
use crate::domain::ports::{ApiRequest, AuthApi, GoogleLogin, HttpGateway};

use super::dto::{GoogleLoginDto, TokenPairDto};
use super::expect_success;

/// Auth endpoint client over the raw gateway.
///
/// These calls never go through the authenticated client: a refresh must
/// not recurse into another refresh.
pub struct HttpAuthApi {
    gateway: Arc<dyn HttpGateway>,
}

impl HttpAuthApi {
    /// Build a client over the transport gateway.
    #[must_use]
    pub fn new(gateway: Arc<dyn HttpGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn refresh(&self, refresh_token: &str) -> ClientResult<TokenPair> {
        let request = ApiRequest::post(
            "/api/auth/refresh",
            serde_json::json!({ "refreshToken": refresh_token }),
        );
        let response = self.gateway.execute(request).await.map_err(Error::from)?;
        if matches!(response.status, 401 | 403) {
            return Err(Error::auth_expired("refresh token rejected by the server"));
        }
        let response = expect_success(response)?;
        response.json::<TokenPairDto>()?.into_domain()
    }

    async fn exchange_google_code(&self, code: &str) -> ClientResult<GoogleLogin> {
        let request = ApiRequest::post("/api/auth/google", serde_json::json!({ "code": code }));
        let response = self.gateway.execute(request).await.map_err(Error::from)?;
        let response = expect_success(response)?;
        response.json::<GoogleLoginDto>()?.into_domain()
    }
}
