//! Idle and expiry policy state machine.
//!
//! Pure state: the service feeds in the clock reading and the decoded token
//! expiry, the policy answers with a directive. Idle wins over everything
//! else; a user who walked away is logged out even while the token is still
//! valid.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Default inactivity limit before a forced logout.
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Default horizon before expiry at which a proactive refresh starts.
const DEFAULT_REFRESH_HORIZON: Duration = Duration::from_secs(5 * 60);

/// Thresholds driving the monitor policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorThresholds {
    /// Inactivity limit before a forced logout.
    pub idle_timeout: Duration,
    /// Horizon before token expiry at which a proactive refresh starts.
    pub refresh_horizon: Duration,
}

impl Default for MonitorThresholds {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            refresh_horizon: DEFAULT_REFRESH_HORIZON,
        }
    }
}

/// Why the policy demanded a logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// No activity for at least the idle timeout.
    Idle,
}

/// Directive for one monitor check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorDirective {
    /// Nothing to do until the next check.
    Continue,
    /// Refresh the access token now, before it expires.
    RefreshNow,
    /// End the session.
    ForceLogout(LogoutReason),
}

/// Mutable policy state shared across monitor checks.
#[derive(Debug, Clone)]
pub struct MonitorPolicyState {
    thresholds: MonitorThresholds,
    last_activity: DateTime<Utc>,
}

impl MonitorPolicyState {
    /// Build policy state rooted at the provided clock instant.
    #[must_use]
    pub fn new(now: DateTime<Utc>, thresholds: MonitorThresholds) -> Self {
        Self {
            thresholds,
            last_activity: now,
        }
    }

    /// Record a user interaction.
    pub fn record_activity(&mut self, now: DateTime<Utc>) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }

    /// Evaluate one check.
    ///
    /// `token_expiry` is the decoded access token expiry; `None` means the
    /// payload was not decodable, which reads as refresh-due so the session
    /// either proves itself renewable or ends.
    #[must_use]
    pub fn evaluate(
        &self,
        now: DateTime<Utc>,
        token_expiry: Option<DateTime<Utc>>,
    ) -> MonitorDirective {
        if self.is_idle(now) {
            return MonitorDirective::ForceLogout(LogoutReason::Idle);
        }

        let refresh_due = match token_expiry {
            None => true,
            Some(expiry) => match chrono::Duration::from_std(self.thresholds.refresh_horizon) {
                Ok(horizon) => expiry <= now + horizon,
                Err(_) => true,
            },
        };
        if refresh_due {
            MonitorDirective::RefreshNow
        } else {
            MonitorDirective::Continue
        }
    }

    fn is_idle(&self, now: DateTime<Utc>) -> bool {
        let Ok(idle_timeout) = chrono::Duration::from_std(self.thresholds.idle_timeout) else {
            return false;
        };
        now - self.last_activity >= idle_timeout
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid time")
    }

    fn far_expiry(now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        Some(now + chrono::Duration::hours(6))
    }

    #[rstest]
    fn thirty_minutes_of_silence_forces_logout(now: DateTime<Utc>) {
        let state = MonitorPolicyState::new(now, MonitorThresholds::default());
        let later = now + chrono::Duration::minutes(30);
        assert_eq!(
            state.evaluate(later, far_expiry(later)),
            MonitorDirective::ForceLogout(LogoutReason::Idle)
        );
    }

    #[rstest]
    fn activity_just_before_the_limit_keeps_the_session(now: DateTime<Utc>) {
        let mut state = MonitorPolicyState::new(now, MonitorThresholds::default());
        let almost = now + chrono::Duration::minutes(29) + chrono::Duration::seconds(59);
        assert_eq!(
            state.evaluate(almost, far_expiry(almost)),
            MonitorDirective::Continue
        );

        state.record_activity(almost);
        let later = almost + chrono::Duration::minutes(29);
        assert_eq!(
            state.evaluate(later, far_expiry(later)),
            MonitorDirective::Continue
        );
    }

    #[rstest]
    #[case::inside_horizon(4, MonitorDirective::RefreshNow)]
    #[case::at_horizon(5, MonitorDirective::RefreshNow)]
    #[case::outside_horizon(6, MonitorDirective::Continue)]
    fn refresh_fires_inside_the_horizon(
        now: DateTime<Utc>,
        #[case] minutes_left: i64,
        #[case] expected: MonitorDirective,
    ) {
        let state = MonitorPolicyState::new(now, MonitorThresholds::default());
        let expiry = Some(now + chrono::Duration::minutes(minutes_left));
        assert_eq!(state.evaluate(now, expiry), expected);
    }

    #[rstest]
    fn undecodable_expiry_reads_as_refresh_due(now: DateTime<Utc>) {
        let state = MonitorPolicyState::new(now, MonitorThresholds::default());
        assert_eq!(state.evaluate(now, None), MonitorDirective::RefreshNow);
    }

    #[rstest]
    fn idle_wins_over_refresh(now: DateTime<Utc>) {
        let state = MonitorPolicyState::new(now, MonitorThresholds::default());
        let later = now + chrono::Duration::minutes(45);
        assert_eq!(
            state.evaluate(later, Some(later + chrono::Duration::minutes(1))),
            MonitorDirective::ForceLogout(LogoutReason::Idle)
        );
    }

    #[rstest]
    fn stale_activity_readings_do_not_rewind(now: DateTime<Utc>) {
        let mut state = MonitorPolicyState::new(now, MonitorThresholds::default());
        state.record_activity(now - chrono::Duration::minutes(10));
        let later = now + chrono::Duration::minutes(30);
        assert_eq!(
            state.evaluate(later, far_expiry(later)),
            MonitorDirective::ForceLogout(LogoutReason::Idle)
        );
    }
}
