/*
[INPUT]:  HTTP configuration (base URL, timeouts, auth token)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use crate::http::{NailgunError, Result};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Default Nailgun API endpoint (master node)
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Header carrying the Keystone token
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Main HTTP client for the Nailgun API
#[derive(Debug, Clone)]
pub struct NailgunClient {
    http_client: Client,
    base_url: Url,
    auth_token: Option<String>,
    timeout: Duration,
}

impl NailgunClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a new client pointing at a specific API root
    pub fn with_config_and_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            auth_token: None,
            timeout: config.timeout,
        })
    }

    /// Set the token sent with every request
    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.auth_token = Some(token.into());
    }

    /// Get the auth token if set
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn api_url(&self, endpoint: &str) -> std::result::Result<Url, url::ParseError> {
        self.base_url.join(endpoint)
    }

    /// Build request builder for an API endpoint
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.api_url(endpoint)?;
        let builder = self.http_client.request(method, url);
        Ok(match &self.auth_token {
            Some(token) => builder.header(AUTH_TOKEN_HEADER, token),
            None => builder,
        })
    }

    /// Send a request and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> Result<T> {
        let body = self.send_raw(endpoint, builder).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Send a request whose response body is ignored
    pub(crate) async fn send_empty(&self, endpoint: &str, builder: RequestBuilder) -> Result<()> {
        self.send_raw(endpoint, builder).await.map(|_| ())
    }

    async fn send_raw(&self, endpoint: &str, builder: RequestBuilder) -> Result<String> {
        let response = builder.send().await.map_err(|err| self.map_transport(err))?;
        let status = response.status();
        let body = response.text().await.map_err(|err| self.map_transport(err))?;
        debug!(endpoint, status = status.as_u16(), "nailgun response");

        if !status.is_success() {
            return Err(NailgunError::from_status(status, endpoint, body));
        }
        Ok(body)
    }

    fn map_transport(&self, err: reqwest::Error) -> NailgunError {
        if err.is_timeout() {
            NailgunError::Timeout {
                duration: self.timeout.as_secs(),
            }
        } else {
            NailgunError::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_auth_token_header_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/version"))
            .and(header("X-Auth-Token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "release": "6.0"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut client =
            NailgunClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
                .expect("client init");
        client.set_auth_token("secret");

        let builder = client.request(Method::GET, "/api/version").expect("builder");
        let body: serde_json::Value = client
            .send_json("/api/version", builder)
            .await
            .expect("version request");
        assert_eq!(body["release"], "6.0");
    }

    #[tokio::test]
    async fn test_error_status_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clusters/9"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = NailgunClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
            .expect("client init");
        let builder = client.request(Method::GET, "/api/clusters/9").expect("builder");
        let err = client
            .send_json::<serde_json::Value>("/api/clusters/9", builder)
            .await
            .expect_err("missing cluster");
        assert!(err.is_not_found());
    }
}
