//! Client configuration parsing and validation.
//!
//! This module centralises the environment-driven settings so they are
//! validated consistently and can be tested in isolation. The API base URL
//! and OAuth client id are required; tuning knobs fall back to their
//! defaults with a warning when set to something unusable.

use std::time::Duration;

use mockable::Env;
use tracing::warn;
use url::Url;

use crate::domain::auth::UserId;

const API_BASE_URL_ENV: &str = "ERAIIZ_API_BASE_URL";
const GOOGLE_CLIENT_ID_ENV: &str = "ERAIIZ_GOOGLE_CLIENT_ID";
const REQUEST_TIMEOUT_ENV: &str = "ERAIIZ_REQUEST_TIMEOUT_SECS";
const POLL_INTERVAL_ENV: &str = "ERAIIZ_POLL_INTERVAL_SECS";
const RECONNECT_DELAY_ENV: &str = "ERAIIZ_RECONNECT_DELAY_SECS";
const IDLE_TIMEOUT_ENV: &str = "ERAIIZ_IDLE_TIMEOUT_SECS";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const URL_EXPECTED: &str = "absolute http or https URL";
const SECONDS_EXPECTED: &str = "positive whole number of seconds";

/// Errors raised while validating client configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Human-readable expectation.
        expected: &'static str,
    },
}

/// Validated client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the marketplace REST API.
    pub api_base_url: Url,
    /// Google OAuth client id for the sign-in flow.
    pub google_client_id: String,
    /// Per-request client timeout.
    pub request_timeout: Duration,
    /// Polling fallback interval.
    pub poll_interval: Duration,
    /// Real-time channel reconnect delay.
    pub reconnect_delay: Duration,
    /// Inactivity limit before a forced logout.
    pub idle_timeout: Duration,
    realtime_base: Url,
}

impl ClientConfig {
    /// Build settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the base URL or OAuth client id is
    /// missing or unusable. Invalid tuning values only warn and fall back.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigError> {
        let raw_base = env
            .string(API_BASE_URL_ENV)
            .ok_or(ConfigError::MissingEnv {
                name: API_BASE_URL_ENV,
            })?;
        let api_base_url = parse_base_url(&raw_base)?;
        let realtime_base = realtime_base_for(&api_base_url, &raw_base)?;

        let google_client_id = env
            .string(GOOGLE_CLIENT_ID_ENV)
            .ok_or(ConfigError::MissingEnv {
                name: GOOGLE_CLIENT_ID_ENV,
            })?;
        if google_client_id.trim().is_empty() {
            return Err(ConfigError::InvalidEnv {
                name: GOOGLE_CLIENT_ID_ENV,
                value: google_client_id,
                expected: "non-empty client id",
            });
        }

        Ok(Self {
            api_base_url,
            google_client_id,
            request_timeout: duration_from_env(env, REQUEST_TIMEOUT_ENV, DEFAULT_REQUEST_TIMEOUT),
            poll_interval: duration_from_env(env, POLL_INTERVAL_ENV, DEFAULT_POLL_INTERVAL),
            reconnect_delay: duration_from_env(env, RECONNECT_DELAY_ENV, DEFAULT_RECONNECT_DELAY),
            idle_timeout: duration_from_env(env, IDLE_TIMEOUT_ENV, DEFAULT_IDLE_TIMEOUT),
            realtime_base,
        })
    }

    /// WebSocket endpoint for one user's real-time channel.
    #[must_use]
    pub fn realtime_url(&self, user_id: &UserId) -> Url {
        let mut url = self.realtime_base.clone();
        url.query_pairs_mut().append_pair("userId", user_id.as_ref());
        url
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |value: &str| ConfigError::InvalidEnv {
        name: API_BASE_URL_ENV,
        value: value.to_owned(),
        expected: URL_EXPECTED,
    };
    let url = Url::parse(raw).map_err(|_| invalid(raw))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid(raw));
    }
    Ok(url)
}

fn realtime_base_for(api_base_url: &Url, raw: &str) -> Result<Url, ConfigError> {
    let mut url = api_base_url.clone();
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme).map_err(|()| ConfigError::InvalidEnv {
        name: API_BASE_URL_ENV,
        value: raw.to_owned(),
        expected: URL_EXPECTED,
    })?;
    url.set_path("/");
    url.set_query(None);
    Ok(url)
}

fn duration_from_env<E: Env>(env: &E, name: &'static str, default: Duration) -> Duration {
    let Some(value) = env.string(name) else {
        return default;
    };
    match value.parse::<u64>() {
        Ok(seconds) if seconds > 0 => Duration::from_secs(seconds),
        _ => {
            warn!(
                value = %value,
                "invalid {name}; expected {SECONDS_EXPECTED}, using default"
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.
    use std::collections::HashMap;

    use mockable::MockEnv;
    use rstest::rstest;

    use super::*;

    fn mock_env(vars: HashMap<String, String>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        env
    }

    fn required_vars() -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert(
            API_BASE_URL_ENV.to_owned(),
            "https://api.eraiiz.com".to_owned(),
        );
        vars.insert(
            GOOGLE_CLIENT_ID_ENV.to_owned(),
            "client-id-123".to_owned(),
        );
        vars
    }

    #[test]
    fn defaults_apply_when_tuning_vars_are_absent() {
        let config = ClientConfig::from_env(&mock_env(required_vars())).expect("valid config");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.reconnect_delay, Duration::from_secs(5));
        assert_eq!(config.idle_timeout, Duration::from_secs(1_800));
    }

    #[test]
    fn missing_base_url_is_an_error() {
        let mut vars = required_vars();
        vars.remove(API_BASE_URL_ENV);
        let error = ClientConfig::from_env(&mock_env(vars)).expect_err("must fail");
        assert!(matches!(
            error,
            ConfigError::MissingEnv {
                name: API_BASE_URL_ENV
            }
        ));
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://api.eraiiz.com")]
    #[case("/relative/path")]
    fn unusable_base_urls_are_errors(#[case] raw: &str) {
        let mut vars = required_vars();
        vars.insert(API_BASE_URL_ENV.to_owned(), raw.to_owned());
        let error = ClientConfig::from_env(&mock_env(vars)).expect_err("must fail");
        assert!(matches!(error, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn invalid_tuning_values_fall_back_with_a_warning() {
        let mut vars = required_vars();
        vars.insert(POLL_INTERVAL_ENV.to_owned(), "soon".to_owned());
        vars.insert(REQUEST_TIMEOUT_ENV.to_owned(), "0".to_owned());
        let config = ClientConfig::from_env(&mock_env(vars)).expect("valid config");
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn tuning_overrides_apply() {
        let mut vars = required_vars();
        vars.insert(IDLE_TIMEOUT_ENV.to_owned(), "600".to_owned());
        let config = ClientConfig::from_env(&mock_env(vars)).expect("valid config");
        assert_eq!(config.idle_timeout, Duration::from_secs(600));
    }

    #[rstest]
    #[case("https://api.eraiiz.com", "wss://api.eraiiz.com/?userId=user-1")]
    #[case("http://localhost:4000/api", "ws://localhost:4000/?userId=user-1")]
    fn realtime_url_switches_scheme_and_scopes_to_the_user(
        #[case] base: &str,
        #[case] expected: &str,
    ) {
        let mut vars = required_vars();
        vars.insert(API_BASE_URL_ENV.to_owned(), base.to_owned());
        let config = ClientConfig::from_env(&mock_env(vars)).expect("valid config");
        let user_id = UserId::new("user-1").expect("valid id");
        assert_eq!(config.realtime_url(&user_id).as_str(), expected);
    }
}
