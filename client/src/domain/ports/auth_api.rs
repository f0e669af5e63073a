//! Unauthenticated auth endpoints port.
//!
//! These calls never carry a bearer token: refresh exchanges the stored
//! refresh token and the Google flow exchanges an OAuth authorisation code.

use async_trait::async_trait;

use crate::domain::auth::{TokenPair, UserProfile};
use crate::domain::error::ClientResult;

/// Result of a completed Google OAuth code exchange.
///
/// New accounts come back with the `pending` role until the user picks buyer
/// or seller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleLogin {
    /// Freshly issued token pair.
    pub tokens: TokenPair,
    /// Authenticated profile.
    pub user: UserProfile,
}

/// Port for the unauthenticated auth endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange `refresh_token` for a new token pair.
    ///
    /// # Errors
    ///
    /// Any error here means the session cannot be silently renewed; callers
    /// escalate to a forced logout.
    async fn refresh(&self, refresh_token: &str) -> ClientResult<TokenPair>;

    /// Exchange a Google OAuth authorisation code for a session.
    async fn exchange_google_code(&self, code: &str) -> ClientResult<GoogleLogin>;
}
