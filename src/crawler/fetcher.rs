//! HTTP transport for the comment API
//!
//! This module provides the transport seam used by the comment client:
//! - [`Transport`] trait: one GET with query parameters, returning parsed JSON
//! - [`HttpTransport`]: the `reqwest` implementation with a persistent cookie session
//!
//! Requests are never retried here. A failed page aborts the pagination loop
//! that issued it.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT},
    Client, Response,
};
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::utils::error::FetchError;

/// Issues a single GET request and returns the decoded JSON body.
///
/// Implementations are reused sequentially for every page of a video. The
/// comment client never issues two requests concurrently through one transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `endpoint` (a path such as `/api/comment/list/`) with `query`
    async fn get_json(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Value, FetchError>;
}

/// `reqwest`-backed transport
pub struct HttpTransport {
    /// HTTP client with cookie store, compression and timeout
    client: Client,

    /// Scheme and host every endpoint is resolved against
    base_url: Url,

    /// Browser-like headers sent with every request
    headers: HeaderMap,
}

impl HttpTransport {
    /// Create a transport from client configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if the base URL does not parse and
    /// `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", config.base_url)))?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .gzip(true)
            .cookie_store(config.enable_cookies)
            .build()?;

        let headers = build_headers(&config.user_agent, base_url.as_str());

        Ok(Self {
            client,
            base_url,
            headers,
        })
    }

    /// Create a transport pointing at a custom base URL, e.g. a mock server
    ///
    /// # Errors
    ///
    /// Same as [`HttpTransport::new`]
    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let config = ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        };
        Self::new(&config)
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(endpoint)
            .map_err(|e| FetchError::InvalidUrl(format!("{endpoint}: {e}")))
    }

    /// Read the body and parse it as JSON
    async fn decode_response(response: Response) -> Result<Value, FetchError> {
        let bytes = response.bytes().await?;
        decode_body(&bytes)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        let url = self.endpoint_url(endpoint)?;

        tracing::trace!(url = %url, ?query, "GET");

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ServerError(status.as_u16()));
        }

        Self::decode_response(response).await
    }
}

/// Parse a response body into JSON.
///
/// An empty body is a decode failure, not an empty page.
pub fn decode_body(bytes: &[u8]) -> Result<Value, FetchError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(FetchError::Decode("empty response body".to_string()));
    }

    serde_json::from_slice(bytes).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Build browser-like headers for the comment API
///
/// # Arguments
///
/// * `user_agent` - User agent string
/// * `referer` - Referer URL, normally the platform's home page
pub fn build_headers(user_agent: &str, referer: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    if let Ok(value) = HeaderValue::from_str(referer) {
        headers.insert(REFERER, value);
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    headers
}
