//! Session aggregate combining tokens with the authenticated profile.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{TokenPair, UserProfile};

/// A live authenticated session.
///
/// `expires_at` is derived from the access token's `exp` claim at
/// construction. It is `None` when the token payload is not decodable; the
/// guard and the session monitor both treat that as not trustworthy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    tokens: TokenPair,
    user: UserProfile,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Build a session from a token pair and profile.
    #[must_use]
    pub fn new(tokens: TokenPair, user: UserProfile) -> Self {
        let expires_at = tokens.access.expires_at();
        Self {
            tokens,
            user,
            expires_at,
        }
    }

    /// Current token pair.
    #[must_use]
    pub fn tokens(&self) -> &TokenPair {
        &self.tokens
    }

    /// Authenticated user profile.
    #[must_use]
    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    /// Access token expiry, when the token payload was decodable.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the access token has expired at `now`.
    ///
    /// An undecodable expiry reads as expired so callers fail closed.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => true,
        }
    }

    /// Whether the access token expires within `horizon` of `now`.
    #[must_use]
    pub fn expires_within(&self, now: DateTime<Utc>, horizon: Duration) -> bool {
        let Ok(horizon) = chrono::Duration::from_std(horizon) else {
            return true;
        };
        match self.expires_at {
            Some(expires_at) => expires_at <= now + horizon,
            None => true,
        }
    }

    /// Same profile with a freshly issued token pair.
    #[must_use]
    pub fn with_tokens(&self, tokens: TokenPair) -> Self {
        Self::new(tokens, self.user.clone())
    }

    /// Same tokens with an updated profile.
    #[must_use]
    pub(crate) fn with_user(&self, user: UserProfile) -> Self {
        Self {
            tokens: self.tokens.clone(),
            user,
            expires_at: self.expires_at,
        }
    }
}
