//! Driven ports the domain depends on.
//!
//! One port per file, each with its own error enum and, where useful, a
//! fixture implementation. Adapters live under `outbound`; tests mock these
//! traits or script them with in-memory doubles.

mod account_api;
mod auth_api;
mod http;
mod navigator;
mod notifications_api;
mod orders_api;
mod persistence;
mod realtime;
mod shopping_api;

pub use self::account_api::{AccountApi, ProfileUpdate};
pub use self::auth_api::{AuthApi, GoogleLogin};
pub use self::http::{ApiRequest, ApiResponse, ApiTransportError, HttpGateway, HttpMethod};
pub use self::navigator::{Navigator, RedirectTarget};
pub use self::notifications_api::NotificationsApi;
pub use self::orders_api::OrdersApi;
pub use self::persistence::{
    InMemoryStateStore, PersistedSession, SearchHistoryPersistence, SessionPersistence,
    StateStoreError,
};
pub use self::realtime::{RealtimeConnection, RealtimeConnector, RealtimeError};
pub use self::shopping_api::{CartKey, ShoppingApi};

#[cfg(test)]
pub use self::account_api::MockAccountApi;
#[cfg(test)]
pub use self::auth_api::MockAuthApi;
#[cfg(test)]
pub use self::http::MockHttpGateway;
#[cfg(test)]
pub use self::notifications_api::MockNotificationsApi;
#[cfg(test)]
pub use self::orders_api::MockOrdersApi;
#[cfg(test)]
pub use self::persistence::{MockSearchHistoryPersistence, MockSessionPersistence};
#[cfg(test)]
pub use self::shopping_api::MockShoppingApi;
