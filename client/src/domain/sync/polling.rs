//! Polling fallback loop.
//!
//! Guarantees eventual freshness independent of the real-time channel: one
//! immediate fetch, then a fixed-interval re-fetch for as long as the handle
//! lives, plus an immediate fetch whenever the embedding UI signals that the
//! document became visible again. Interval and poke listener tear down
//! together, so nothing keeps firing after the owning view unmounts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::error::ClientResult;

use super::{Sleeper, TokioSleeper};

/// Default interval between authoritative re-fetches.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Polling tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingSyncConfig {
    /// Delay between one settled fetch and the next.
    pub interval: Duration,
}

impl Default for PollingSyncConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Anything that can re-fetch its authoritative state.
#[async_trait]
pub trait PollTarget: Send + Sync {
    /// Short label for logging.
    fn name(&self) -> &'static str;

    /// Fetch the authoritative resource and reconcile local state.
    async fn poll(&self) -> ClientResult<()>;
}

/// Interval-driven poller for one target.
pub struct PollingSync {
    target: Arc<dyn PollTarget>,
    sleeper: Arc<dyn Sleeper>,
    config: PollingSyncConfig,
}

/// Handle scoping the poll loop to the owning view's lifetime.
pub struct PollingHandle {
    shutdown: watch::Sender<bool>,
    poke: Arc<Notify>,
    task: JoinHandle<()>,
}

impl PollingHandle {
    /// Trigger an immediate fetch, used when the document regains
    /// visibility.
    pub fn poke(&self) {
        self.poke.notify_one();
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

impl PollingSync {
    /// Build a poller with the default tokio sleeper.
    #[must_use]
    pub fn new(target: Arc<dyn PollTarget>, config: PollingSyncConfig) -> Self {
        Self::with_runtime(target, Arc::new(TokioSleeper), config)
    }

    /// Build a poller with an injected sleeper.
    #[must_use]
    pub fn with_runtime(
        target: Arc<dyn PollTarget>,
        sleeper: Arc<dyn Sleeper>,
        config: PollingSyncConfig,
    ) -> Self {
        Self {
            target,
            sleeper,
            config,
        }
    }

    /// Start the loop. The first fetch happens immediately.
    #[must_use]
    pub fn spawn(self) -> PollingHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let poke = Arc::new(Notify::new());
        let poke_rx = poke.clone();
        let task = tokio::spawn(async move {
            loop {
                if *shutdown_rx.borrow() {
                    break;
                }
                if let Err(error) = self.target.poll().await {
                    // Feed state carries the error for inline display; the
                    // loop itself keeps going.
                    warn!(feed = self.target.name(), error = %error, "poll failed");
                }

                let stop = tokio::select! {
                    () = self.sleeper.sleep(self.config.interval) => false,
                    () = poke_rx.notified() => {
                        debug!(feed = self.target.name(), "visibility poke; fetching now");
                        false
                    }
                    _ = shutdown_rx.changed() => true,
                };
                if stop {
                    break;
                }
            }
        });
        PollingHandle {
            shutdown,
            poke,
            task,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use crate::domain::error::Error;
    use crate::test_support::sync::{HangingSleeper, RecordingSleeper};

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    struct CountingTarget {
        polls: AtomicUsize,
        signal: mpsc::UnboundedSender<usize>,
        fail: bool,
    }

    impl CountingTarget {
        fn new(signal: mpsc::UnboundedSender<usize>, fail: bool) -> Self {
            Self {
                polls: AtomicUsize::new(0),
                signal,
                fail,
            }
        }
    }

    #[async_trait]
    impl PollTarget for CountingTarget {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn poll(&self) -> ClientResult<()> {
            let count = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = self.signal.send(count);
            if self.fail {
                Err(Error::timeout("scripted poll failure"))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn polls_repeatedly_on_the_interval() {
        let (signal, mut polls) = mpsc::unbounded_channel();
        let target = Arc::new(CountingTarget::new(signal, false));
        let sleeper = Arc::new(RecordingSleeper::default());
        let handle = PollingSync::with_runtime(
            target,
            sleeper.clone(),
            PollingSyncConfig {
                interval: Duration::from_secs(30),
            },
        )
        .spawn();

        for expected in 1..=3_usize {
            let seen = timeout(WAIT, polls.recv())
                .await
                .expect("poll observed")
                .expect("signal open");
            assert_eq!(seen, expected);
        }
        handle.stopped().await;

        let recorded = sleeper.recorded();
        assert!(recorded.len() >= 2);
        assert!(recorded.iter().all(|delay| *delay == Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn poll_failures_do_not_stop_the_loop() {
        let (signal, mut polls) = mpsc::unbounded_channel();
        let target = Arc::new(CountingTarget::new(signal, true));
        let handle = PollingSync::with_runtime(
            target,
            Arc::new(RecordingSleeper::default()),
            PollingSyncConfig::default(),
        )
        .spawn();

        for _ in 0..3 {
            timeout(WAIT, polls.recv())
                .await
                .expect("poll observed")
                .expect("signal open");
        }
        handle.stopped().await;
    }

    #[tokio::test]
    async fn poke_triggers_an_immediate_fetch() {
        let (signal, mut polls) = mpsc::unbounded_channel();
        let target = Arc::new(CountingTarget::new(signal, false));
        let handle = PollingSync::with_runtime(
            target,
            Arc::new(HangingSleeper),
            PollingSyncConfig::default(),
        )
        .spawn();

        // Initial fetch happens without any poke.
        let first = timeout(WAIT, polls.recv())
            .await
            .expect("poll observed")
            .expect("signal open");
        assert_eq!(first, 1);

        handle.poke();
        let second = timeout(WAIT, polls.recv())
            .await
            .expect("poll observed")
            .expect("signal open");
        assert_eq!(second, 2);

        handle.stopped().await;
    }

    #[tokio::test]
    async fn no_fetches_after_teardown() {
        let (signal, mut polls) = mpsc::unbounded_channel();
        let target = Arc::new(CountingTarget::new(signal, false));
        let handle = PollingSync::with_runtime(
            target.clone(),
            Arc::new(HangingSleeper),
            PollingSyncConfig::default(),
        )
        .spawn();

        timeout(WAIT, polls.recv())
            .await
            .expect("poll observed")
            .expect("signal open");
        handle.stopped().await;

        let settled = target.polls.load(Ordering::SeqCst);
        tokio::task::yield_now().await;
        assert_eq!(target.polls.load(Ordering::SeqCst), settled);
        assert!(polls.try_recv().is_err());
    }
}
