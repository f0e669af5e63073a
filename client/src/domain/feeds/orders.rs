//! Order board state and reconciliation.
//!
//! Order status transitions are owned by the backend. This board only
//! reflects pushed or polled updates and never originates a transition.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::{ClientResult, Error};
use crate::domain::events::RealtimeEvent;
use crate::domain::ports::OrdersApi;
use crate::domain::sync::{PollTarget, RealtimeHandler};

/// Server-authoritative order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

/// One order as shown in the buyer or seller order list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryItem {
    /// Stable order id.
    pub id: String,
    /// Product label.
    pub product: String,
    /// Order total.
    pub price: f64,
    /// Current status.
    pub status: OrderStatus,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
struct BoardState {
    items: Vec<OrderSummaryItem>,
    last_error: Option<Error>,
}

/// Read-through cache of the user's orders.
pub struct OrderFeed {
    api: Arc<dyn OrdersApi>,
    state: Mutex<BoardState>,
}

impl OrderFeed {
    /// Build an empty board over the order endpoints.
    #[must_use]
    pub fn new(api: Arc<dyn OrdersApi>) -> Self {
        Self {
            api,
            state: Mutex::new(BoardState::default()),
        }
    }

    /// Current list, newest first.
    #[must_use]
    pub fn items(&self) -> Vec<OrderSummaryItem> {
        self.state
            .lock()
            .map(|state| state.items.clone())
            .unwrap_or_default()
    }

    /// Most recent fetch failure, cleared by the next successful poll.
    #[must_use]
    pub fn last_error(&self) -> Option<Error> {
        self.state
            .lock()
            .map(|state| state.last_error.clone())
            .unwrap_or_default()
    }

    /// Patch the status of one order by id.
    ///
    /// Unknown ids are ignored: a pushed update for an order outside the
    /// current page must neither insert nor fail.
    pub fn apply_status(&self, order_id: &str, status: OrderStatus) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        match state.items.iter_mut().find(|item| item.id == order_id) {
            Some(item) => item.status = status,
            None => debug!(order_id = %order_id, "status update for unknown order ignored"),
        }
    }

    /// Prepend a newly created order, ignoring ids already present.
    pub fn apply_new(&self, order: OrderSummaryItem) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.items.iter().any(|item| item.id == order.id) {
            return;
        }
        state.items.insert(0, order);
    }

    /// Replace the list with the authoritative server snapshot.
    pub fn reconcile(&self, server_items: Vec<OrderSummaryItem>) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.items = server_items;
        state.last_error = None;
    }
}

impl RealtimeHandler for OrderFeed {
    fn handle_event(&self, event: &RealtimeEvent) {
        match event {
            RealtimeEvent::OrderUpdate { order_id, status } => {
                self.apply_status(order_id, *status);
            }
            RealtimeEvent::NewOrder { order } => self.apply_new(order.clone()),
            RealtimeEvent::OrderCancelled { order_id } => {
                self.apply_status(order_id, OrderStatus::Cancelled);
            }
            RealtimeEvent::Notification(_) => {}
        }
    }
}

#[async_trait]
impl PollTarget for OrderFeed {
    fn name(&self) -> &'static str {
        "orders"
    }

    async fn poll(&self) -> ClientResult<()> {
        match self.api.list().await {
            Ok(items) => {
                self.reconcile(items);
                Ok(())
            }
            Err(error) => {
                if let Ok(mut state) = self.state.lock() {
                    state.last_error = Some(error.clone());
                }
                Err(error)
            }
        }
    }
}
