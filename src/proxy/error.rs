//! Proxy error types.

use thiserror::Error;

/// Errors that can occur while proxying a request to the Admin API.
///
/// # Example
///
/// ```rust
/// use shopify_oauth_proxy::proxy::ProxyError;
///
/// let error = ProxyError::Forbidden { route: "/webhooks".to_string() };
/// assert_eq!(error.status_code(), 403);
/// assert!(error.to_string().contains("/webhooks"));
/// ```
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The caller did not present a usable `shop` and `access_token` cookie pair.
    #[error("Missing or invalid session cookies")]
    Unauthorized,

    /// The route is blacklisted or malformed.
    #[error("Route '{route}' is not allowed")]
    Forbidden {
        /// The rejected route.
        route: String,
    },

    /// The Admin API answered with a non-success status.
    #[error("Upstream responded with status {status}")]
    Upstream {
        /// The HTTP status code returned.
        status: u16,
    },

    /// The Admin API could not be reached (network error or timeout).
    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProxyError {
    /// Returns the HTTP status code reported to the caller for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden { .. } => 403,
            Self::Upstream { .. } | Self::Http(_) => 500,
        }
    }
}

// Verify ProxyError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ProxyError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ProxyError::Unauthorized.status_code(), 401);
        assert_eq!(
            ProxyError::Forbidden {
                route: "/oauth".to_string()
            }
            .status_code(),
            403
        );
        assert_eq!(ProxyError::Upstream { status: 404 }.status_code(), 500);
    }

    #[test]
    fn test_upstream_error_includes_status() {
        let error = ProxyError::Upstream { status: 502 };
        assert!(error.to_string().contains("502"));
    }
}
