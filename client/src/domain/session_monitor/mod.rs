//! Idle/expiry session monitor.
//!
//! A background loop that proactively ends stale sessions instead of waiting
//! for a request to fail: it renews tokens approaching expiry and logs the
//! user out after a long stretch of inactivity. Once the session ends the
//! loop ends with it; there is no monitor activity after teardown.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mockable::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::session_store::SessionStore;
use crate::domain::sync::{Sleeper, TokioSleeper};

mod policy;

pub use self::policy::{LogoutReason, MonitorDirective, MonitorPolicyState, MonitorThresholds};

/// Default delay between monitor checks.
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Monitor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionMonitorConfig {
    /// Delay between checks.
    pub check_interval: Duration,
    /// Idle and refresh thresholds.
    pub thresholds: MonitorThresholds,
}

impl Default for SessionMonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
            thresholds: MonitorThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    Continue,
    Terminate,
}

/// Background session monitor.
pub struct SessionMonitor {
    store: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    config: SessionMonitorConfig,
    policy: Mutex<MonitorPolicyState>,
}

/// Handle scoping the monitor loop to the session's lifetime.
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
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

impl SessionMonitor {
    /// Build a monitor with the default tokio sleeper.
    #[must_use]
    pub fn new(store: Arc<SessionStore>, clock: Arc<dyn Clock>, config: SessionMonitorConfig) -> Self {
        Self::with_runtime(store, clock, Arc::new(TokioSleeper), config)
    }

    /// Build a monitor with an injected sleeper.
    #[must_use]
    pub fn with_runtime(
        store: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
        config: SessionMonitorConfig,
    ) -> Self {
        let policy = MonitorPolicyState::new(clock.utc(), config.thresholds);
        Self {
            store,
            clock,
            sleeper,
            config,
            policy: Mutex::new(policy),
        }
    }

    /// Record a user interaction (pointer, key, touch, scroll, click).
    ///
    /// The embedding UI forwards its interaction events here.
    pub fn record_activity(&self) {
        let now = self.clock.utc();
        if let Ok(mut policy) = self.policy.lock() {
            policy.record_activity(now);
        }
    }

    /// Start the recurring check loop.
    #[must_use]
    pub fn spawn(self: Arc<Self>) -> MonitorHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let monitor = self;
        let task = tokio::spawn(async move {
            loop {
                let stop = tokio::select! {
                    () = monitor.sleeper.sleep(monitor.config.check_interval) => false,
                    _ = shutdown_rx.changed() => true,
                };
                if stop || matches!(monitor.tick().await, TickOutcome::Terminate) {
                    break;
                }
            }
        });
        MonitorHandle { shutdown, task }
    }

    async fn tick(&self) -> TickOutcome {
        let Some(session) = self.store.snapshot() else {
            // Logged out elsewhere; nothing left to watch.
            return TickOutcome::Terminate;
        };
        let now = self.clock.utc();
        let directive = match self.policy.lock() {
            Ok(policy) => policy.evaluate(now, session.expires_at()),
            Err(_) => return TickOutcome::Terminate,
        };

        match directive {
            MonitorDirective::Continue => TickOutcome::Continue,
            MonitorDirective::RefreshNow => match self.store.refresh_now().await {
                Ok(()) => TickOutcome::Continue,
                Err(error) => {
                    // The store has already ended the session.
                    warn!(error = %error, "proactive refresh failed");
                    TickOutcome::Terminate
                }
            },
            MonitorDirective::ForceLogout(reason) => {
                info!(?reason, "session monitor forcing logout");
                self.store.force_logout("idle timeout").await;
                TickOutcome::Terminate
            }
        }
    }
}
