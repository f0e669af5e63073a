//! Optimistic cart and favorites state.
//!
//! Every mutation applies locally first, awaits the server, and then either
//! confirms or reverts. Settled state always reflects server-confirmed
//! truth; nothing here is fire-and-forget.

mod cart;
mod favorites;

pub use self::cart::{Cart, CartItem};
pub use self::favorites::Favorites;

use crate::domain::error::Error;

/// Outcome of one optimistic mutation after the server call settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The server confirmed the optimistic state.
    Confirmed,
    /// The server call failed; the optimistic state was rolled back and the
    /// error should be surfaced (toast or inline).
    Reverted(Error),
}

impl MutationOutcome {
    /// Whether the mutation was confirmed.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}
