//! Authenticated order endpoints port.

use async_trait::async_trait;

use crate::domain::error::ClientResult;
use crate::domain::feeds::OrderSummaryItem;

/// Port for the authenticated order endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Fetch the authoritative order list, newest first.
    async fn list(&self) -> ClientResult<Vec<OrderSummaryItem>>;
}
