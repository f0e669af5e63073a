//! Session guard for protected views.
//!
//! The embedding UI asks the guard before rendering a protected subtree.
//! The policy check is pure; [`SessionGuard`] pairs it with navigation so
//! call sites stay free of redirect bookkeeping.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::debug;

use crate::domain::auth::{Role, Session};
use crate::domain::ports::{Navigator, RedirectTarget};
use crate::domain::session_store::SessionStore;

/// Requirements a view places on the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Exact role required, when the view is role-scoped.
    pub required_role: Option<Role>,
    /// Capabilities the session's role must grant.
    pub required_permissions: Vec<String>,
}

impl AccessPolicy {
    /// Policy that only requires a live session.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Policy requiring an exact role.
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        Self {
            required_role: Some(role),
            required_permissions: Vec::new(),
        }
    }

    /// Add a required capability.
    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.required_permissions.push(permission.into());
        self
    }

    /// Evaluate this policy against a session snapshot.
    ///
    /// Fails closed: a missing session or an expired (or undecodable) access
    /// token redirects to login before any privilege question is asked.
    #[must_use]
    pub fn evaluate(&self, session: Option<&Session>, now: DateTime<Utc>) -> AccessDecision {
        let Some(session) = session else {
            return AccessDecision::RedirectToLogin;
        };
        if session.is_expired(now) {
            return AccessDecision::RedirectToLogin;
        }

        let role = session.user().role();
        if self.required_role.is_some_and(|required| required != role) {
            return AccessDecision::RedirectToUnauthorized;
        }
        if self
            .required_permissions
            .iter()
            .any(|permission| !role.has_permission(permission))
        {
            return AccessDecision::RedirectToUnauthorized;
        }

        AccessDecision::Grant
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Render the protected subtree.
    Grant,
    /// No usable session; navigate to the login page.
    RedirectToLogin,
    /// Authenticated but lacking role or permissions.
    RedirectToUnauthorized,
}

/// Guard wiring the policy check to the session store and navigation.
pub struct SessionGuard {
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
}

impl SessionGuard {
    /// Build a guard over the shared session store.
    #[must_use]
    pub fn new(
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            navigator,
            clock,
        }
    }

    /// Check `policy`, navigating away on failure.
    ///
    /// Returns whether the protected subtree may render.
    pub fn admit(&self, policy: &AccessPolicy) -> bool {
        let snapshot = self.store.snapshot();
        match policy.evaluate(snapshot.as_ref(), self.clock.utc()) {
            AccessDecision::Grant => true,
            AccessDecision::RedirectToLogin => {
                debug!("guard rejected view: no usable session");
                self.navigator.redirect(RedirectTarget::Login);
                false
            }
            AccessDecision::RedirectToUnauthorized => {
                debug!("guard rejected view: insufficient privileges");
                self.navigator.redirect(RedirectTarget::Unauthorized);
                false
            }
        }
    }
}
