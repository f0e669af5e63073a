//! Real-time channel manager.
//!
//! Maintains a best-effort live feed of server-pushed events for one
//! authenticated user: `disconnected -> connecting -> connected`, back to
//! `disconnected` on any error, and reconnecting after a fixed backoff for
//! as long as the owning handle lives. Failures here never reach the user;
//! the paired polling loop guarantees correctness.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::auth::UserId;
use crate::domain::events::RealtimeEvent;
use crate::domain::ports::{RealtimeConnection, RealtimeConnector};

use super::{BackoffJitter, ReconnectJitter, Sleeper, TokioSleeper};

/// Fixed delay before a reconnect attempt.
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Channel tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeChannelConfig {
    /// Base delay between a drop and the next connect attempt.
    pub reconnect_delay: Duration,
}

impl Default for RealtimeChannelConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
}

/// Consumer of decoded server-pushed events.
///
/// Handlers ignore variants they do not care about; one event fans out to
/// every registered handler.
pub trait RealtimeHandler: Send + Sync {
    /// Apply one event to local state.
    fn handle_event(&self, event: &RealtimeEvent);
}

/// Manager owning one connection per authenticated user.
pub struct RealtimeChannel {
    connector: Arc<dyn RealtimeConnector>,
    handlers: Vec<Arc<dyn RealtimeHandler>>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    jitter: Arc<dyn BackoffJitter>,
    config: RealtimeChannelConfig,
    state: watch::Sender<ChannelState>,
}

/// Handle scoping the channel to the owning view's lifetime.
///
/// Stopping (or dropping) the handle closes the connection and schedules no
/// further reconnect attempts.
pub struct ChannelHandle {
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<ChannelState>,
    task: JoinHandle<()>,
}

impl ChannelHandle {
    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    /// Request teardown.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Request teardown and wait for the loop to finish.
    pub async fn stopped(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

impl RealtimeChannel {
    /// Build a channel with default runtime dependencies.
    #[must_use]
    pub fn new(
        connector: Arc<dyn RealtimeConnector>,
        handlers: Vec<Arc<dyn RealtimeHandler>>,
        clock: Arc<dyn Clock>,
        config: RealtimeChannelConfig,
    ) -> Self {
        Self::with_runtime(
            connector,
            handlers,
            clock,
            Arc::new(TokioSleeper),
            Arc::new(ReconnectJitter),
            config,
        )
    }

    /// Build a channel with injected runtime abstractions.
    #[must_use]
    pub fn with_runtime(
        connector: Arc<dyn RealtimeConnector>,
        handlers: Vec<Arc<dyn RealtimeHandler>>,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
        jitter: Arc<dyn BackoffJitter>,
        config: RealtimeChannelConfig,
    ) -> Self {
        let (state, _) = watch::channel(ChannelState::Disconnected);
        Self {
            connector,
            handlers,
            clock,
            sleeper,
            jitter,
            config,
            state,
        }
    }

    /// Start the connect/read/reconnect loop for `user_id`.
    #[must_use]
    pub fn spawn(self: Arc<Self>, user_id: UserId) -> ChannelHandle {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let state = self.state.subscribe();
        let channel = self;
        let task = tokio::spawn(async move {
            channel.run(user_id, shutdown_rx).await;
        });
        ChannelHandle {
            shutdown,
            state,
            task,
        }
    }

    async fn run(&self, user_id: UserId, mut shutdown: watch::Receiver<bool>) {
        let mut attempt: u32 = 0;
        loop {
            if *shutdown.borrow() {
                break;
            }
            self.set_state(ChannelState::Connecting);

            let outcome = tokio::select! {
                result = self.connector.connect(&user_id) => Some(result),
                _ = shutdown.changed() => None,
            };
            let Some(result) = outcome else {
                break;
            };

            match result {
                Ok(mut connection) => {
                    info!(user_id = %user_id, "realtime channel connected");
                    self.set_state(ChannelState::Connected);
                    attempt = 0;
                    let stopped = self.pump(connection.as_mut(), &mut shutdown).await;
                    self.set_state(ChannelState::Disconnected);
                    if stopped {
                        break;
                    }
                }
                Err(error) => {
                    // Degrades silently; polling covers correctness.
                    debug!(error = %error, "realtime connect failed");
                    self.set_state(ChannelState::Disconnected);
                }
            }

            attempt = attempt.saturating_add(1);
            let delay =
                self.jitter
                    .jittered_delay(self.config.reconnect_delay, attempt, self.clock.utc());
            let stop = tokio::select! {
                () = self.sleeper.sleep(delay) => false,
                _ = shutdown.changed() => true,
            };
            if stop {
                break;
            }
        }
        self.set_state(ChannelState::Disconnected);
    }

    /// Read frames until the connection ends or shutdown is requested.
    ///
    /// Returns whether the loop should stop entirely.
    async fn pump(
        &self,
        connection: &mut dyn RealtimeConnection,
        shutdown: &mut watch::Receiver<bool>,
    ) -> bool {
        loop {
            tokio::select! {
                frame = connection.next_frame() => match frame {
                    Ok(Some(text)) => self.dispatch(&text),
                    Ok(None) => {
                        debug!("realtime peer closed the connection");
                        return false;
                    }
                    Err(error) => {
                        warn!(error = %error, "realtime read failed");
                        return false;
                    }
                },
                _ = shutdown.changed() => {
                    connection.close().await;
                    return true;
                }
            }
        }
    }

    fn dispatch(&self, raw: &str) {
        match RealtimeEvent::parse(raw) {
            Ok(event) => {
                for handler in &self.handlers {
                    handler.handle_event(&event);
                }
            }
            Err(error) => warn!(error = %error, "discarding malformed realtime payload"),
        }
    }

    fn set_state(&self, state: ChannelState) {
        self.state.send_replace(state);
    }
}
