//! Notification feed state and reconciliation.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::error::{ClientResult, Error};
use crate::domain::events::RealtimeEvent;
use crate::domain::ports::NotificationsApi;
use crate::domain::sync::{PollTarget, RealtimeHandler};

/// Notification category as sent by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Order,
    Product,
    Account,
    System,
}

/// One server-owned notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    /// Stable notification id.
    pub id: String,
    /// Notification category.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Human-readable message.
    pub message: String,
    /// Whether the user has read this notification.
    #[serde(default)]
    pub read: bool,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Opaque category-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Default)]
struct FeedState {
    items: Vec<NotificationItem>,
    /// Ids with an in-flight mark-read call. While an id is here, polling
    /// keeps its optimistic `read` flag; once the call settles the server
    /// response is authoritative again.
    pending_reads: HashSet<String>,
    last_error: Option<Error>,
}

/// Read-through cache of the user's notifications.
pub struct NotificationFeed {
    api: Arc<dyn NotificationsApi>,
    state: Mutex<FeedState>,
}

impl NotificationFeed {
    /// Build an empty feed over the notification endpoints.
    #[must_use]
    pub fn new(api: Arc<dyn NotificationsApi>) -> Self {
        Self {
            api,
            state: Mutex::new(FeedState::default()),
        }
    }

    /// Current list, newest first.
    #[must_use]
    pub fn items(&self) -> Vec<NotificationItem> {
        self.state
            .lock()
            .map(|state| state.items.clone())
            .unwrap_or_default()
    }

    /// Number of unread notifications.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.items.iter().filter(|item| !item.read).count())
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

    /// Prepend a server-pushed notification, ignoring ids already present.
    pub fn apply_incoming(&self, item: NotificationItem) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.items.iter().any(|existing| existing.id == item.id) {
            return;
        }
        state.items.insert(0, item);
    }

    /// Replace the list with the authoritative server snapshot.
    ///
    /// Optimistic read flags survive only for ids with an unsettled mark-read
    /// call; everything else is taken from the server verbatim, so applying
    /// the same snapshot twice yields the same list.
    pub fn reconcile(&self, server_items: Vec<NotificationItem>) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let pending = state.pending_reads.clone();
        state.items = server_items
            .into_iter()
            .map(|mut item| {
                if pending.contains(&item.id) {
                    item.read = true;
                }
                item
            })
            .collect();
        state.last_error = None;
    }

    /// Mark one notification read, optimistically, then confirm with the
    /// server.
    ///
    /// # Errors
    ///
    /// On a server failure the optimistic flag is reverted and the error is
    /// returned for inline display.
    pub async fn mark_read(&self, id: &str) -> ClientResult<()> {
        {
            let mut state = self
                .state
                .lock()
                .map_err(|_| Error::internal("notification state poisoned"))?;
            let Some(item) = state.items.iter_mut().find(|item| item.id == id) else {
                return Err(Error::not_found(format!("unknown notification {id}")));
            };
            if item.read {
                return Ok(());
            }
            item.read = true;
            state.pending_reads.insert(id.to_owned());
        }

        match self.api.mark_read(id).await {
            Ok(()) => {
                if let Ok(mut state) = self.state.lock() {
                    state.pending_reads.remove(id);
                }
                Ok(())
            }
            Err(error) => {
                warn!(notification_id = %id, error = %error, "mark-read failed; reverting");
                if let Ok(mut state) = self.state.lock() {
                    state.pending_reads.remove(id);
                    if let Some(item) = state.items.iter_mut().find(|item| item.id == id) {
                        item.read = false;
                    }
                }
                Err(error)
            }
        }
    }

    /// Mark every notification read, optimistically, then confirm.
    ///
    /// # Errors
    ///
    /// On failure every optimistic flag is restored to its prior value.
    pub async fn mark_all_read(&self) -> ClientResult<()> {
        let previously_unread: Vec<String> = {
            let mut state = self
                .state
                .lock()
                .map_err(|_| Error::internal("notification state poisoned"))?;
            let unread: Vec<String> = state
                .items
                .iter()
                .filter(|item| !item.read)
                .map(|item| item.id.clone())
                .collect();
            for item in &mut state.items {
                item.read = true;
            }
            for id in &unread {
                state.pending_reads.insert(id.clone());
            }
            unread
        };

        let result = self.api.mark_all_read().await;
        if let Ok(mut state) = self.state.lock() {
            for id in &previously_unread {
                state.pending_reads.remove(id);
            }
            if result.is_err() {
                for item in &mut state.items {
                    if previously_unread.contains(&item.id) {
                        item.read = false;
                    }
                }
            }
        }
        result
    }

    /// Delete one notification on the server, then drop it locally.
    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.api.delete(id).await?;
        if let Ok(mut state) = self.state.lock() {
            state.items.retain(|item| item.id != id);
            state.pending_reads.remove(id);
        }
        Ok(())
    }
}

impl RealtimeHandler for NotificationFeed {
    fn handle_event(&self, event: &RealtimeEvent) {
        if let RealtimeEvent::Notification(item) = event {
            debug!(notification_id = %item.id, "applying pushed notification");
            self.apply_incoming(item.clone());
        }
    }
}

#[async_trait]
impl PollTarget for NotificationFeed {
    fn name(&self) -> &'static str {
        "notifications"
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
