//! Session lifecycle and real-time synchronisation core for the Eraiiz
//! marketplace client.
//!
//! The crate is organised hexagonally: `domain` owns the session, feed, and
//! policy logic behind driven ports, while `outbound` provides the reqwest,
//! WebSocket, and file-persistence adapters that talk to the marketplace
//! backend and local state.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::ClientConfig;
pub use domain::{ClientResult, Error, ErrorCode};
