//! Reconciled list state fed by both the real-time channel and polling.
//!
//! Feeds are reducers over server-owned lists. Both update paths may apply
//! overlapping information in any order, so every mutation patches by id and
//! re-applying the same snapshot is a no-op.

mod notifications;
mod orders;

pub use self::notifications::{NotificationFeed, NotificationItem, NotificationKind};
pub use self::orders::{OrderFeed, OrderStatus, OrderSummaryItem};
