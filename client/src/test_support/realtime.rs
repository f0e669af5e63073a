//! Scripted real-time transport doubles.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::domain::auth::UserId;
use crate::domain::ports::{RealtimeConnection, RealtimeConnector, RealtimeError};

/// One scripted connect attempt.
pub enum ConnectOutcome {
    /// The connection fails to establish.
    Fail(RealtimeError),
    /// The connection establishes and yields `frames`.
    Stream {
        /// Frames in arrival order.
        frames: Vec<Result<String, RealtimeError>>,
        /// Whether the connection stays open after the frames drain instead
        /// of closing.
        hold_open: bool,
        /// Set when the channel closes the connection.
        closed: Arc<AtomicBool>,
    },
}

/// Connector replaying scripted connect attempts.
///
/// Once the script is exhausted, connect attempts hang until the channel is
/// shut down, still signalling each attempt first.
pub struct ScriptedConnector {
    script: Mutex<VecDeque<ConnectOutcome>>,
    connects: AtomicUsize,
    signal: Option<UnboundedSender<usize>>,
}

impl ScriptedConnector {
    /// Build a connector over a scripted sequence.
    pub fn new(script: Vec<ConnectOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            connects: AtomicUsize::new(0),
            signal: None,
        }
    }

    /// Build a connector that reports each connect attempt on `signal`.
    pub fn with_signal(script: Vec<ConnectOutcome>, signal: UnboundedSender<usize>) -> Self {
        Self {
            signal: Some(signal),
            ..Self::new(script)
        }
    }

    /// Number of connect attempts so far.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RealtimeConnector for ScriptedConnector {
    async fn connect(
        &self,
        _user_id: &UserId,
    ) -> Result<Box<dyn RealtimeConnection>, RealtimeError> {
        let attempt = self.connects.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(signal) = &self.signal {
            let _ = signal.send(attempt);
        }

        let outcome = self.script.lock().expect("script mutex").pop_front();
        match outcome {
            Some(ConnectOutcome::Fail(error)) => Err(error),
            Some(ConnectOutcome::Stream {
                frames,
                hold_open,
                closed,
            }) => Ok(Box::new(ScriptedConnection {
                frames: frames.into(),
                hold_open,
                closed,
            })),
            None => {
                // Script drained: hang until the owning channel shuts down.
                std::future::pending::<()>().await;
                Err(RealtimeError::connect("unreachable after pending"))
            }
        }
    }
}

struct ScriptedConnection {
    frames: VecDeque<Result<String, RealtimeError>>,
    hold_open: bool,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl RealtimeConnection for ScriptedConnection {
    async fn next_frame(&mut self) -> Result<Option<String>, RealtimeError> {
        match self.frames.pop_front() {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(error)) => Err(error),
            None => {
                if self.hold_open {
                    std::future::pending::<()>().await;
                }
                Ok(None)
            }
        }
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
