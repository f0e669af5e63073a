//! Reqwest-backed HTTP gateway adapter.
//!
//! This adapter owns transport details only: URL construction, the fixed
//! client timeout, header plumbing, and transport error mapping. Status
//! handling belongs to the callers.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::domain::error::Error;
use crate::domain::ports::{ApiRequest, ApiResponse, ApiTransportError, HttpGateway, HttpMethod};

/// Correlation header forwarded with every request.
const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Gateway performing requests against one API base URL.
pub struct ReqwestGateway {
    client: Client,
    base: Url,
}

impl ReqwestGateway {
    /// Build a gateway using a reqwest client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| Error::internal(format!("failed to build HTTP client: {error}")))?;
        Ok(Self {
            client,
            base: config.api_base_url.clone(),
        })
    }

    fn build_url(&self, path: &str, query: &[(String, String)]) -> Url {
        let mut url = self.base.clone();
        let joined = format!("{}{}", self.base.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (key.as_str(), value.as_str())));
        }
        url
    }
}

#[async_trait]
impl HttpGateway for ReqwestGateway {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiTransportError> {
        let url = self.build_url(&request.path, &request.query);
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, request.request_id.to_string());
        if let Some(bearer) = &request.bearer {
            builder = builder.bearer_auth(bearer);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(path = %request.path, status, request_id = %request.request_id, "request settled");
        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> ApiTransportError {
    if error.is_timeout() {
        ApiTransportError::timeout(error.to_string())
    } else {
        ApiTransportError::transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network gateway helpers.
    use std::collections::HashMap;

    use mockable::MockEnv;
    use rstest::rstest;

    use super::*;

    fn gateway(base: &str) -> ReqwestGateway {
        let mut env = MockEnv::new();
        let vars: HashMap<String, String> = HashMap::from([
            ("ERAIIZ_API_BASE_URL".to_owned(), base.to_owned()),
            ("ERAIIZ_GOOGLE_CLIENT_ID".to_owned(), "client-id".to_owned()),
        ]);
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        let config = ClientConfig::from_env(&env).expect("valid config");
        ReqwestGateway::new(&config).expect("gateway builds")
    }

    #[rstest]
    #[case::plain_base(
        "https://api.eraiiz.com",
        "/api/orders",
        "https://api.eraiiz.com/api/orders"
    )]
    #[case::base_with_prefix(
        "http://localhost:4000/backend",
        "/api/orders",
        "http://localhost:4000/backend/api/orders"
    )]
    #[case::trailing_slash_base(
        "https://api.eraiiz.com/",
        "/api/auth/session",
        "https://api.eraiiz.com/api/auth/session"
    )]
    fn joins_paths_against_the_base(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let url = gateway(base).build_url(path, &[]);
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn appends_query_pairs() {
        let url = gateway("https://api.eraiiz.com").build_url(
            "/api/notifications",
            &[("unread".to_owned(), "true".to_owned())],
        );
        assert_eq!(
            url.as_str(),
            "https://api.eraiiz.com/api/notifications?unread=true"
        );
    }
}
