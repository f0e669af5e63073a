//! Navigation port.
//!
//! The domain decides when to leave a protected view; the embedding shell
//! decides how. Keeping this behind a trait lets the session store guarantee
//! the exactly-once logout redirect without knowing anything about routing.

/// Destination of a forced navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    /// The login page, for missing or unrecoverable credentials.
    Login,
    /// The unauthorized page, for insufficient role or permissions.
    Unauthorized,
}

/// Port performing a navigation on behalf of the domain.
pub trait Navigator: Send + Sync {
    /// Navigate to `target`.
    fn redirect(&self, target: RedirectTarget);
}
