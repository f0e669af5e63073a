//! Authenticated account endpoints port.

use async_trait::async_trait;

use crate::domain::auth::{Role, UserProfile};
use crate::domain::error::ClientResult;

/// Partial profile update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name, when changing it.
    pub name: Option<String>,
    /// New contact email, when changing it.
    pub email: Option<String>,
    /// Role selection for accounts still in the `pending` role.
    pub role: Option<Role>,
}

/// Port for the authenticated account endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Fetch the server's view of the current session profile.
    async fn fetch_session(&self) -> ClientResult<UserProfile>;

    /// Fetch the current user's profile.
    async fn me(&self) -> ClientResult<UserProfile>;

    /// Apply a partial profile update and return the new profile.
    async fn update_me(&self, update: &ProfileUpdate) -> ClientResult<UserProfile>;

    /// Request account deletion.
    async fn delete_account(&self) -> ClientResult<()>;
}
