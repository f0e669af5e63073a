//! Outbound adapters.
//!
//! Everything that touches the network or the filesystem lives here, behind
//! the ports defined in `domain::ports`.

pub mod http;
pub mod persistence;
pub mod ws;
