//! HTTP client for the Shopify Admin REST API.
//!
//! [`AdminClient`] sends authenticated `GET` requests on behalf of one
//! [`Session`] and hands the raw response back unparsed.

use axum::body::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};

use crate::auth::Session;
use crate::config::ProxyConfig;
use crate::proxy::ProxyError;

/// Crate version from Cargo.toml.
pub const PROXY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header carrying the access token on Admin API calls.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// A successful Admin API response, body untouched.
#[derive(Clone, Debug)]
pub struct UpstreamResponse {
    /// The upstream `Content-Type`, if any.
    pub content_type: Option<String>,
    /// The body exactly as received.
    pub body: Bytes,
}

/// HTTP client for Admin API calls made with one session's token.
///
/// The client handles:
/// - Base URI construction from the session shop (or the configured override)
/// - Default headers: `User-Agent`, `Accept` and the access token
///
/// No retries are attempted; the configured timeout lives on the shared
/// `reqwest::Client`.
///
/// # Thread Safety
///
/// `AdminClient` is `Send + Sync`, making it safe to share across async tasks.
#[derive(Debug)]
pub struct AdminClient<'a> {
    client: &'a reqwest::Client,
    base_uri: String,
    default_headers: HeaderMap,
}

// Verify AdminClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AdminClient<'static>>();
};

impl<'a> AdminClient<'a> {
    /// Creates a client for `session`.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Unauthorized`] if the token cannot be used as a
    /// header value (it contains control characters).
    pub fn new(
        client: &'a reqwest::Client,
        config: &ProxyConfig,
        session: &Session,
    ) -> Result<Self, ProxyError> {
        let base_uri = config.upstream_origin(&session.shop);

        let mut default_headers = HeaderMap::new();
        let user_agent = format!("shopify-oauth-proxy v{PROXY_VERSION}");
        if let Ok(value) = HeaderValue::from_str(&user_agent) {
            default_headers.insert(USER_AGENT, value);
        }
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut token = HeaderValue::from_str(session.access_token.as_ref())
            .map_err(|_| ProxyError::Unauthorized)?;
        token.set_sensitive(true);
        default_headers.insert(ACCESS_TOKEN_HEADER, token);

        Ok(Self {
            client,
            base_uri,
            default_headers,
        })
    }

    /// Returns the base URI for this client.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Builds `{base}/admin{route}.json`, plus `?{query}` when `query` is non-empty.
    #[must_use]
    pub fn url_for(&self, route: &str, query: Option<&str>) -> String {
        let mut url = format!("{}/admin{}.json", self.base_uri, route);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Sends `GET {base}/admin{route}.json?{query}`.
    ///
    /// # Errors
    ///
    /// - [`ProxyError::Http`] on network failure or timeout
    /// - [`ProxyError::Upstream`] on a non-2xx status
    pub async fn get(&self, route: &str, query: Option<&str>) -> Result<UpstreamResponse, ProxyError> {
        let url = self.url_for(route, query);

        let response = self
            .client
            .get(&url)
            .headers(self.default_headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                route,
                request_id = response
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok()),
                "Admin API returned an error"
            );
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.bytes().await?;

        Ok(UpstreamResponse { content_type, body })
    }
}
