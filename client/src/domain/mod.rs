//! Domain entities, policies, and services.
//!
//! Purpose: keep every credential read/write, reducer, and lifecycle policy
//! behind strongly typed modules so adapters stay thin. Ports live under
//! [`ports`]; everything else here is transport agnostic.

pub mod auth;
pub mod error;
pub mod events;
pub mod feeds;
pub mod guard;
pub mod http_client;
pub mod ports;
pub mod search_history;
pub mod session_monitor;
pub mod session_store;
pub mod shopping;
pub mod sync;

pub use self::auth::{
    AccessToken, RefreshToken, Role, Session, TokenPair, UserId, UserProfile,
};
pub use self::error::{ClientResult, Error, ErrorCode};
pub use self::events::RealtimeEvent;
pub use self::guard::{AccessDecision, AccessPolicy, SessionGuard};
pub use self::http_client::AuthHttpClient;
pub use self::session_monitor::{SessionMonitor, SessionMonitorConfig};
pub use self::session_store::SessionStore;
