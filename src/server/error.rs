//! Server error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::auth::oauth::OAuthError;
use crate::proxy::ProxyError;

/// Error returned by route handlers.
///
/// Bodies are short plain-text messages. The full error is logged, never sent.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Handshake failure.
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// Proxy failure.
    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

/// Error that stops the server from starting or serving.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The shared HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The listener could not be bound or the server failed.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns the status code and body sent to the caller.
    #[must_use]
    pub fn status_and_body(&self) -> (StatusCode, &'static str) {
        let status = match self {
            Self::OAuth(e) => e.status_code(),
            Self::Proxy(e) => e.status_code(),
        };
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match self {
            Self::OAuth(OAuthError::MissingParameter { name: "shop" }) => "no shop",
            Self::OAuth(OAuthError::MissingParameter { .. }) => "missing parameter",
            Self::OAuth(OAuthError::InvalidShop { .. }) => "invalid shop",
            Self::OAuth(OAuthError::ForgeryCheckFailed) => "cannot be verified",
            Self::OAuth(OAuthError::SignatureInvalid) => "HMAC validation failed",
            Self::Proxy(ProxyError::Unauthorized) => "unauthorized",
            Self::Proxy(ProxyError::Forbidden { .. }) => "endpoint blacklisted",
            Self::OAuth(
                OAuthError::StateHashFailed { .. }
                | OAuthError::TokenExchangeFailed { .. }
                | OAuthError::Http(_),
            )
            | Self::Proxy(ProxyError::Upstream { .. } | ProxyError::Http(_)) => {
                "something went wrong"
            }
        };

        (status, body)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Server error");
        } else {
            tracing::warn!(status = %status, error = %self, "Client error");
        }

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_shop_body() {
        let error = ServerError::from(OAuthError::MissingParameter { name: "shop" });
        assert_eq!(
            error.status_and_body(),
            (StatusCode::BAD_REQUEST, "no shop")
        );
    }

    #[test]
    fn test_forgery_body() {
        let error = ServerError::from(OAuthError::ForgeryCheckFailed);
        assert_eq!(
            error.status_and_body(),
            (StatusCode::UNAUTHORIZED, "cannot be verified")
        );
    }

    #[test]
    fn test_signature_body() {
        let error = ServerError::from(OAuthError::SignatureInvalid);
        assert_eq!(
            error.status_and_body(),
            (StatusCode::BAD_REQUEST, "HMAC validation failed")
        );
    }

    #[test]
    fn test_exchange_failure_hides_detail() {
        let error = ServerError::from(OAuthError::TokenExchangeFailed {
            status: 401,
            message: "client_secret is wrong".to_string(),
        });
        assert_eq!(
            error.status_and_body(),
            (StatusCode::INTERNAL_SERVER_ERROR, "something went wrong")
        );
    }

    #[test]
    fn test_proxy_bodies() {
        assert_eq!(
            ServerError::from(ProxyError::Unauthorized).status_and_body(),
            (StatusCode::UNAUTHORIZED, "unauthorized")
        );
        assert_eq!(
            ServerError::from(ProxyError::Forbidden {
                route: "/webhooks".to_string()
            })
            .status_and_body(),
            (StatusCode::FORBIDDEN, "endpoint blacklisted")
        );
        assert_eq!(
            ServerError::from(ProxyError::Upstream { status: 503 }).status_and_body(),
            (StatusCode::INTERNAL_SERVER_ERROR, "something went wrong")
        );
    }
}
