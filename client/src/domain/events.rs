//! Server-pushed event payloads.
//!
//! Inbound frames are JSON objects. Order events carry a `type`
//! discriminator; notification payloads arrive bare, carrying their own
//! category field instead. Events are transient: each one is consumed once
//! to patch in-memory state and never persisted.

use serde::Deserialize;

use crate::domain::feeds::{NotificationItem, OrderStatus, OrderSummaryItem};

/// One decoded real-time event.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    /// Status change for an existing order.
    OrderUpdate {
        /// Target order id.
        order_id: String,
        /// New status.
        status: OrderStatus,
    },
    /// A newly created order.
    NewOrder {
        /// Full order payload.
        order: OrderSummaryItem,
    },
    /// An order was cancelled.
    OrderCancelled {
        /// Target order id.
        order_id: String,
    },
    /// A bare notification payload.
    Notification(NotificationItem),
}

/// Errors raised while decoding an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventParseError {
    /// The frame was not a JSON object or did not match any known shape.
    #[error("malformed realtime payload: {message}")]
    Malformed {
        /// Decoder failure detail.
        message: String,
    },
}

impl EventParseError {
    fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedOrderEvent {
    #[serde(rename_all = "camelCase")]
    OrderUpdate {
        order_id: String,
        status: OrderStatus,
    },
    NewOrder {
        order: OrderSummaryItem,
    },
    #[serde(rename_all = "camelCase")]
    OrderCancelled {
        order_id: String,
    },
}

const ORDER_EVENT_TYPES: [&str; 3] = ["order_update", "new_order", "order_cancelled"];

impl RealtimeEvent {
    /// Decode one raw text frame.
    ///
    /// # Errors
    ///
    /// Returns [`EventParseError::Malformed`] for frames that are neither a
    /// tagged order event nor a notification payload. Callers log and skip
    /// these; a bad frame never tears the channel down.
    pub fn parse(raw: &str) -> Result<Self, EventParseError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|error| EventParseError::malformed(format!("invalid JSON: {error}")))?;

        let tag = value.get("type").and_then(serde_json::Value::as_str);
        if tag.is_some_and(|tag| ORDER_EVENT_TYPES.contains(&tag)) {
            let event: TaggedOrderEvent = serde_json::from_value(value)
                .map_err(|error| EventParseError::malformed(format!("order event: {error}")))?;
            return Ok(match event {
                TaggedOrderEvent::OrderUpdate { order_id, status } => {
                    Self::OrderUpdate { order_id, status }
                }
                TaggedOrderEvent::NewOrder { order } => Self::NewOrder { order },
                TaggedOrderEvent::OrderCancelled { order_id } => Self::OrderCancelled { order_id },
            });
        }

        serde_json::from_value::<NotificationItem>(value)
            .map(Self::Notification)
            .map_err(|error| EventParseError::malformed(format!("notification: {error}")))
    }
}
