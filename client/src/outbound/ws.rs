//! WebSocket adapter for the real-time channel.
//!
//! Connects to the backend's push endpoint with the ws(s) scheme derived
//! from the API base URL, scoped to one user id. Only text frames carry
//! events; control frames are answered by the protocol layer.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use crate::config::ClientConfig;
use crate::domain::auth::UserId;
use crate::domain::ports::{RealtimeConnection, RealtimeConnector, RealtimeError};

/// Connector dialing the marketplace push endpoint.
pub struct TungsteniteConnector {
    config: ClientConfig,
}

impl TungsteniteConnector {
    /// Build a connector from the client configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl RealtimeConnector for TungsteniteConnector {
    async fn connect(
        &self,
        user_id: &UserId,
    ) -> Result<Box<dyn RealtimeConnection>, RealtimeError> {
        let url = self.config.realtime_url(user_id);
        debug!(user_id = %user_id, "dialling realtime endpoint");
        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|error| RealtimeError::connect(error.to_string()))?;
        Ok(Box::new(TungsteniteConnection { stream }))
    }
}

struct TungsteniteConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl RealtimeConnection for TungsteniteConnection {
    async fn next_frame(&mut self) -> Result<Option<String>, RealtimeError> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => return Ok(Some(text)),
                Ok(Message::Close(_)) => return Ok(None),
                // Pings are answered by tungstenite during the read.
                Ok(_) => {}
                Err(error) => return Err(RealtimeError::read(error.to_string())),
            }
        }
        Ok(None)
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
