//! Scripted API and gateway doubles.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::auth::TokenPair;
use crate::domain::error::{ClientResult, Error};
use crate::domain::ports::{
    ApiRequest, ApiResponse, ApiTransportError, AuthApi, GoogleLogin, HttpGateway,
};

/// Auth endpoint double with scripted refresh responses.
///
/// An exhausted script rejects further refreshes, which doubles as the
/// "refresh token revoked" backend behaviour.
#[derive(Default)]
pub struct ScriptedAuthApi {
    refreshes: Mutex<VecDeque<ClientResult<TokenPair>>>,
    refresh_calls: AtomicUsize,
    google_logins: Mutex<VecDeque<ClientResult<GoogleLogin>>>,
}

impl ScriptedAuthApi {
    /// Script a sequence of refresh results.
    pub fn with_refreshes(refreshes: Vec<ClientResult<TokenPair>>) -> Self {
        Self {
            refreshes: Mutex::new(refreshes.into()),
            ..Self::default()
        }
    }

    /// Double whose first refresh is rejected by the server.
    pub fn failing_refresh() -> Self {
        Self::with_refreshes(vec![Err(Error::auth_expired("refresh token rejected"))])
    }

    /// Script a sequence of Google code exchange results.
    pub fn with_google_logins(logins: Vec<ClientResult<GoogleLogin>>) -> Self {
        Self {
            google_logins: Mutex::new(logins.into()),
            ..Self::default()
        }
    }

    /// Number of network refreshes performed.
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for ScriptedAuthApi {
    async fn refresh(&self, _refresh_token: &str) -> ClientResult<TokenPair> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refreshes
            .lock()
            .expect("refresh script mutex")
            .pop_front()
            .unwrap_or_else(|| Err(Error::auth_expired("refresh token rejected")))
    }

    async fn exchange_google_code(&self, _code: &str) -> ClientResult<GoogleLogin> {
        self.google_logins
            .lock()
            .expect("google script mutex")
            .pop_front()
            .unwrap_or_else(|| Err(Error::internal("google script exhausted")))
    }
}

/// Gateway double replaying scripted responses and recording requests.
#[derive(Default)]
pub struct ScriptedGateway {
    responses: Mutex<VecDeque<Result<ApiResponse, ApiTransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedGateway {
    /// Script a sequence of gateway results.
    pub fn with_responses(responses: Vec<Result<ApiResponse, ApiTransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Gateway whose first request times out.
    pub fn timing_out() -> Self {
        Self::with_responses(vec![Err(ApiTransportError::timeout("simulated timeout"))])
    }

    /// Number of executed requests.
    pub fn calls(&self) -> usize {
        self.requests.lock().expect("request log mutex").len()
    }

    /// Bearer tokens attached to executed requests, in order.
    pub fn bearers(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .expect("request log mutex")
            .iter()
            .map(|request| request.bearer.clone())
            .collect()
    }

    /// Executed requests, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("request log mutex").clone()
    }
}

#[async_trait]
impl HttpGateway for ScriptedGateway {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiTransportError> {
        self.requests
            .lock()
            .expect("request log mutex")
            .push(request);
        self.responses
            .lock()
            .expect("response script mutex")
            .pop_front()
            .unwrap_or_else(|| Err(ApiTransportError::transport("gateway script exhausted")))
    }
}
