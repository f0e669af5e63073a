//! Bearer token newtypes and unverified claim extraction.
//!
//! The client never validates token signatures. It only decodes the payload
//! segment of the access token to learn the expiry instant and subject, the
//! same way the embedding UI derives `expiresAt` from its stored token.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use zeroize::Zeroizing;

/// Errors raised while constructing or decoding tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The raw token string was empty or whitespace.
    #[error("token must not be empty")]
    Empty,
    /// The token payload could not be decoded as a JWT claim set.
    #[error("token payload is not decodable: {message}")]
    Malformed {
        /// Decoder failure detail.
        message: String,
    },
}

impl TokenError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Claims the client reads from the access token payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TokenClaims {
    /// Subject, the backend's user identifier.
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiry as seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Short-lived bearer credential authorising API calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Validate and wrap a raw access token string.
    pub fn new(raw: impl Into<String>) -> Result<Self, TokenError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(TokenError::Empty);
        }
        Ok(Self(raw))
    }

    /// Raw token string for the `Authorization` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Decode the unverified claim set from the payload segment.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] when the token is not shaped like a
    /// JWT or the payload is not valid base64url JSON.
    pub fn claims(&self) -> Result<TokenClaims, TokenError> {
        let payload = self
            .0
            .split('.')
            .nth(1)
            .ok_or_else(|| TokenError::malformed("missing payload segment"))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|error| TokenError::malformed(format!("invalid base64url: {error}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|error| TokenError::malformed(format!("invalid claim JSON: {error}")))
    }

    /// Expiry instant from the `exp` claim, when present and decodable.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let claims = self.claims().ok()?;
        claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Subject claim, when present and decodable.
    #[must_use]
    pub fn subject(&self) -> Option<String> {
        self.claims().ok().and_then(|claims| claims.sub)
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Longer-lived credential used to obtain a new access token.
///
/// The raw string is zeroised on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken(Zeroizing<String>);

impl RefreshToken {
    /// Validate and wrap a raw refresh token string.
    pub fn new(raw: impl Into<String>) -> Result<Self, TokenError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(TokenError::Empty);
        }
        Ok(Self(Zeroizing::new(raw)))
    }

    /// Raw token string sent to the refresh endpoint.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Access/refresh token pair as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Bearer credential for API calls.
    pub access: AccessToken,
    /// Credential for silent renewal.
    pub refresh: RefreshToken,
}

impl TokenPair {
    /// Build a pair from raw strings, validating both.
    pub fn from_raw(
        access: impl Into<String>,
        refresh: impl Into<String>,
    ) -> Result<Self, TokenError> {
        Ok(Self {
            access: AccessToken::new(access)?,
            refresh: RefreshToken::new(refresh)?,
        })
    }
}
