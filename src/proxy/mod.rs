//! Admin REST API proxy.
//!
//! [`proxy_request`] forwards a `GET` for an Admin API route on behalf of the
//! caller whose `shop` and `access_token` cookies were read into a
//! [`Session`]. Checks run in this order:
//!
//! 1. a session is present, otherwise [`ProxyError::Unauthorized`]
//! 2. the route decodes to UTF-8, has no `.` or `..` segment and is not
//!    blacklisted, otherwise [`ProxyError::Forbidden`]
//!
//! The route then maps to `https://{shop}/admin{route}.json` and the body of a
//! successful response is returned byte-for-byte.
//!
//! # Example
//!
//! ```rust
//! use shopify_oauth_proxy::proxy::normalize_route;
//!
//! assert_eq!(normalize_route(""), Some("/shop".to_string()));
//! assert_eq!(normalize_route("orders/"), Some("/orders".to_string()));
//! assert_eq!(normalize_route("/products/../webhooks"), None);
//! assert_eq!(normalize_route("/%FF"), None);
//! ```

mod admin_client;
mod blacklist;
mod error;

pub use admin_client::{AdminClient, UpstreamResponse, ACCESS_TOKEN_HEADER, PROXY_VERSION};
pub use blacklist::{is_blacklisted, BLACKLIST};
pub use error::ProxyError;

use crate::auth::Session;
use crate::config::ProxyConfig;

/// Route used when the caller asks for `/api` with nothing after it.
pub const DEFAULT_ROUTE: &str = "/shop";

/// Normalizes the part of the request path after `/api`.
///
/// `raw` is still percent-encoded. It is decoded, given a leading `/`, stripped
/// of empty segments (so trailing and repeated slashes disappear), and each
/// segment is percent-encoded again. An empty route becomes [`DEFAULT_ROUTE`].
/// Returns `None` if the decoded bytes are not UTF-8 or any segment is `.` or
/// `..`.
#[must_use]
pub fn normalize_route(raw: &str) -> Option<String> {
    let decoded = urlencoding::decode(raw).ok()?;
    let mut route = String::with_capacity(decoded.len() + 1);

    for segment in decoded.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." {
            return None;
        }
        route.push('/');
        route.push_str(&urlencoding::encode(segment));
    }

    if route.is_empty() {
        route.push_str(DEFAULT_ROUTE);
    }
    Some(route)
}

/// Forwards one `GET` to the Admin API.
///
/// `raw_route` is the percent-encoded path after `/api`; it is only decoded
/// once the session is known. `query` is the inbound query string, forwarded
/// as-is.
///
/// # Errors
///
/// - [`ProxyError::Unauthorized`] if `session` is `None`
/// - [`ProxyError::Forbidden`] if the route is blacklisted, contains `.` or
///   `..`, or does not decode to UTF-8
/// - [`ProxyError::Upstream`] / [`ProxyError::Http`] if the upstream call fails
pub async fn proxy_request(
    config: &ProxyConfig,
    client: &reqwest::Client,
    session: Option<&Session>,
    raw_route: &str,
    query: Option<&str>,
) -> Result<UpstreamResponse, ProxyError> {
    let session = session.ok_or(ProxyError::Unauthorized)?;

    let route = normalize_route(raw_route).ok_or_else(|| ProxyError::Forbidden {
        route: raw_route.to_string(),
    })?;
    if is_blacklisted(&route) {
        tracing::warn!(shop = %session.shop, route, "blocked blacklisted route");
        return Err(ProxyError::Forbidden { route });
    }

    tracing::debug!(shop = %session.shop, route, "proxying Admin API request");
    AdminClient::new(client, config, session)?
        .get(&route, query)
        .await
}
