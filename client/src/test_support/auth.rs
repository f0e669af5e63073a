//! Token, profile, and session fixtures.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::auth::{AccessToken, Role, Session, TokenPair, UserId, UserProfile};

/// Fixed instant every deterministic test is rooted at.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid time")
}

/// Build an unsigned JWT-shaped token around `claims`.
pub fn unsigned_jwt(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.fixture-signature")
}

/// Access token whose `exp` claim is `expiry`.
pub fn access_token_expiring_at(expiry: DateTime<Utc>) -> AccessToken {
    let raw = unsigned_jwt(&serde_json::json!({
        "sub": "user-1",
        "exp": expiry.timestamp(),
    }));
    AccessToken::new(raw).expect("fixture token")
}

/// Token pair whose access token expires at `expiry`.
pub fn token_pair_expiring_at(expiry: DateTime<Utc>) -> TokenPair {
    TokenPair {
        access: access_token_expiring_at(expiry),
        refresh: crate::domain::auth::RefreshToken::new(format!(
            "refresh-{}",
            expiry.timestamp()
        ))
        .expect("fixture refresh token"),
    }
}

/// Token pair expiring `secs` after [`test_now`].
pub fn token_pair_expiring_in_secs(secs: i64) -> TokenPair {
    token_pair_expiring_at(test_now() + chrono::Duration::seconds(secs))
}

/// Profile fixture with the given role.
pub fn sample_profile(role: Role) -> UserProfile {
    UserProfile::new(
        UserId::new("user-1").expect("fixture id"),
        role,
        "ada@eraiiz.com",
        "Ada Lovelace",
    )
    .expect("fixture profile")
}

/// Session fixture with an explicit role and expiry.
pub fn session_for_role(role: Role, expiry: DateTime<Utc>) -> Session {
    Session::new(token_pair_expiring_at(expiry), sample_profile(role))
}

/// Buyer session expiring at `expiry`.
pub fn session_expiring_at(expiry: DateTime<Utc>) -> Session {
    session_for_role(Role::Buyer, expiry)
}

/// Buyer session whose access token is not JWT shaped.
pub fn session_with_opaque_token() -> Session {
    let tokens =
        TokenPair::from_raw("opaque-access-token", "opaque-refresh-token").expect("fixture pair");
    Session::new(tokens, sample_profile(Role::Buyer))
}
