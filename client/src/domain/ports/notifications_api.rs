//! Authenticated notification endpoints port.

use async_trait::async_trait;

use crate::domain::error::ClientResult;
use crate::domain::feeds::NotificationItem;

/// Port for the authenticated notification endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsApi: Send + Sync {
    /// Fetch the authoritative notification list, newest first.
    async fn list(&self) -> ClientResult<Vec<NotificationItem>>;

    /// Mark one notification as read.
    async fn mark_read(&self, id: &str) -> ClientResult<()>;

    /// Mark every notification as read.
    async fn mark_all_read(&self) -> ClientResult<()>;

    /// Delete one notification.
    async fn delete(&self, id: &str) -> ClientResult<()>;
}
