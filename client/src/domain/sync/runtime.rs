//! Runtime abstractions for timer-driven loops.
//!
//! Sleeping and jitter sit behind traits so the monitor, channel, and
//! polling loops can be driven deterministically in tests.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Async sleeping abstraction.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Reconnect delay jitter abstraction.
pub trait BackoffJitter: Send + Sync {
    /// Return a jittered delay derived from the fixed base delay.
    fn jittered_delay(&self, base: Duration, attempt: u32, now: DateTime<Utc>) -> Duration;
}

/// Default deterministic jitter strategy.
///
/// Adds up to a quarter of the base delay, seeded from the clock's
/// sub-second component and the attempt counter, so simultaneous clients do
/// not reconnect in lockstep.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconnectJitter;

impl BackoffJitter for ReconnectJitter {
    fn jittered_delay(&self, base: Duration, attempt: u32, now: DateTime<Utc>) -> Duration {
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        let max_extra = (base_ms / 4).max(1);
        let seed = u64::from(now.timestamp_subsec_nanos()) ^ u64::from(attempt);
        let extra = seed % (max_extra.saturating_add(1));
        Duration::from_millis(base_ms.saturating_add(extra))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn jitter_stays_within_a_quarter_of_the_base() {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid time");
        let base = Duration::from_secs(5);
        for attempt in 0..16 {
            let delay = ReconnectJitter.jittered_delay(base, attempt, now);
            assert!(delay >= base);
            assert!(delay <= base + Duration::from_millis(1_250));
        }
    }
}
