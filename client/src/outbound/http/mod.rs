//! HTTP adapters for the marketplace REST API.
//!
//! The gateway owns transport; the typed clients own endpoint paths,
//! payload shapes, and response mapping. Authenticated clients are built on
//! [`crate::domain::AuthHttpClient`] so they inherit the single-retry
//! refresh behaviour.

mod account_api;
mod auth_api;
mod dto;
mod gateway;
mod notifications_api;
mod orders_api;
mod shopping_api;

pub use self::account_api::HttpAccountApi;
pub use self::auth_api::HttpAuthApi;
pub use self::gateway::ReqwestGateway;
pub use self::notifications_api::HttpNotificationsApi;
pub use self::orders_api::HttpOrdersApi;
pub use self::shopping_api::HttpShoppingApi;

use crate::domain::error::{ClientResult, Error};
use crate::domain::ports::ApiResponse;

/// Reject non-2xx responses, mapping the status and body to an [`Error`].
pub(crate) fn expect_success(response: ApiResponse) -> ClientResult<ApiResponse> {
    if response.is_success() {
        return Ok(response);
    }
    Err(error_from_response(&response))
}

fn error_from_response(response: &ApiResponse) -> Error {
    let message = server_message(&response.body)
        .unwrap_or_else(|| format!("status {}: {}", response.status, body_preview(&response.body)));
    match response.status {
        400 | 409 | 422 => Error::validation(message),
        401 => Error::auth_expired(message),
        403 => Error::forbidden(message),
        404 => Error::not_found(message),
        408 | 504 => Error::timeout(message),
        _ => Error::transport(message),
    }
}

/// Error text from the server's response body, when it carries one.
fn server_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key))
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
