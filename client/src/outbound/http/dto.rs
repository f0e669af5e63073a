//! Wire DTOs for the auth endpoints.

use serde::Deserialize;

use crate::domain::auth::{TokenPair, UserProfile};
use crate::domain::error::{ClientResult, Error};
use crate::domain::ports::GoogleLogin;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenPairDto {
    access_token: String,
    refresh_token: String,
}

impl TokenPairDto {
    pub(crate) fn into_domain(self) -> ClientResult<TokenPair> {
        TokenPair::from_raw(self.access_token, self.refresh_token)
            .map_err(|error| Error::validation(format!("unusable auth payload: {error}")))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleLoginDto {
    #[serde(flatten)]
    tokens: TokenPairDto,
    user: UserProfile,
}

impl GoogleLoginDto {
    pub(crate) fn into_domain(self) -> ClientResult<GoogleLogin> {
        Ok(GoogleLogin {
            tokens: self.tokens.into_domain()?,
            user: self.user,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn google_login_payload_decodes() {
        let raw = r#"{
            "accessToken": "header.payload.sig",
            "refreshToken": "refresh-1",
            "user": {
                "id": "u9",
                "role": "pending",
                "email": "new@eraiiz.com",
                "name": "New Seller"
            }
        }"#;
        let dto: GoogleLoginDto = serde_json::from_str(raw).expect("payload decodes");
        let login = dto.into_domain().expect("valid domain payload");
        assert_eq!(login.user.id().as_ref(), "u9");
        assert_eq!(login.tokens.refresh.as_str(), "refresh-1");
    }

    #[test]
    fn blank_tokens_are_rejected() {
        let raw = r#"{ "accessToken": "", "refreshToken": "refresh-1" }"#;
        let dto: TokenPairDto = serde_json::from_str(raw).expect("payload decodes");
        let error = dto.into_domain().expect_err("must fail");
        assert_eq!(error.code(), crate::domain::ErrorCode::Validation);
    }
}
