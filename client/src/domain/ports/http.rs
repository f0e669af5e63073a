//! Low-level HTTP gateway port.
//!
//! The gateway owns transport concerns only: it executes one request and
//! returns whatever status the server produced. Authentication recovery is
//! layered on top by the authenticated client, so a `401` here is a normal
//! `Ok` response, not an error.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::domain::auth::AccessToken;
use crate::domain::error::{ClientResult, Error};

/// HTTP method subset used by the marketplace API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

/// One outbound API request.
///
/// Requests are cloneable so the authenticated client can replay them once
/// after a token refresh. Each request carries a correlation id that the
/// gateway forwards as `X-Request-Id`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the configured API base, such as `/api/orders`.
    pub path: String,
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<serde_json::Value>,
    /// Bearer token, when the call is authenticated.
    pub bearer: Option<String>,
    /// Correlation id for tracing.
    pub request_id: Uuid,
}

impl ApiRequest {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            request_id: Uuid::new_v4(),
        }
    }

    /// Build a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Build a POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        let mut request = Self::new(HttpMethod::Post, path);
        request.body = Some(body);
        request
    }

    /// Build a PATCH request with a JSON body.
    #[must_use]
    pub fn patch(path: impl Into<String>, body: serde_json::Value) -> Self {
        let mut request = Self::new(HttpMethod::Patch, path);
        request.body = Some(body);
        request
    }

    /// Build a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Append one query pair.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a bearer token.
    #[must_use]
    pub fn with_bearer(mut self, token: &AccessToken) -> Self {
        self.bearer = Some(token.as_str().to_owned());
        self
    }
}

/// Raw response produced by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the server rejected the bearer token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Decode the body as JSON into `T`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|error| Error::validation(format!("invalid response payload: {error}")))
    }
}

/// Errors surfaced by the transport itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiTransportError {
    /// The request exceeded the configured client timeout.
    #[error("request timed out: {message}")]
    Timeout {
        /// Transport failure detail.
        message: String,
    },
    /// The connection failed before a response arrived.
    #[error("transport failed: {message}")]
    Transport {
        /// Transport failure detail.
        message: String,
    },
    /// The request could not be constructed.
    #[error("request invalid: {message}")]
    InvalidRequest {
        /// Construction failure detail.
        message: String,
    },
}

impl ApiTransportError {
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

impl From<ApiTransportError> for Error {
    fn from(value: ApiTransportError) -> Self {
        match value {
            ApiTransportError::Timeout { message } => Self::timeout(message),
            ApiTransportError::Transport { message } => Self::transport(message),
            ApiTransportError::InvalidRequest { message } => Self::validation(message),
        }
    }
}

/// Port executing one HTTP request against the marketplace backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpGateway: Send + Sync {
    /// Execute `request` and return the raw response.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiTransportError>;
}
