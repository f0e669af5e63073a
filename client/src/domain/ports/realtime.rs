//! Real-time channel transport port.
//!
//! The connector opens one connection per authenticated user; the connection
//! yields raw text frames until the peer closes or the transport fails. The
//! channel manager owns parsing, dispatch, and the reconnect policy.

use async_trait::async_trait;

use crate::domain::auth::UserId;

/// Errors surfaced by the real-time transport.
///
/// These never reach the user: the channel manager logs them and falls back
/// to polling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RealtimeError {
    /// The connection could not be established.
    #[error("realtime connect failed: {message}")]
    Connect {
        /// Transport failure detail.
        message: String,
    },
    /// An established connection failed while reading.
    #[error("realtime read failed: {message}")]
    Read {
        /// Transport failure detail.
        message: String,
    },
}

impl RealtimeError {
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }
}

/// An established real-time connection.
#[async_trait]
pub trait RealtimeConnection: Send {
    /// Wait for the next text frame.
    ///
    /// Returns `Ok(None)` when the peer closed the connection cleanly.
    async fn next_frame(&mut self) -> Result<Option<String>, RealtimeError>;

    /// Close the connection.
    async fn close(&mut self);
}

/// Port establishing real-time connections for one user.
#[async_trait]
pub trait RealtimeConnector: Send + Sync {
    /// Open a connection scoped to `user_id`.
    async fn connect(
        &self,
        user_id: &UserId,
    ) -> Result<Box<dyn RealtimeConnection>, RealtimeError>;
}
