//! OAuth-specific error types.
//!
//! Every failure of the handshake is terminal: the caller starts over from
//! the authorization redirect. The HTTP status each variant maps to lives in
//! [`OAuthError::status_code`].
//!
//! # Example
//!
//! ```rust
//! use shopify_oauth_proxy::auth::oauth::OAuthError;
//!
//! let error = OAuthError::SignatureInvalid;
//! assert_eq!(error.to_string(), "HMAC signature validation failed");
//! assert_eq!(error.status_code(), 400);
//! ```

use thiserror::Error;

/// Errors that can occur during the authorization handshake.
///
/// # Thread Safety
///
/// `OAuthError` is `Send + Sync`, making it safe to use across async boundaries.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// A required query parameter is missing or empty.
    #[error("Missing required parameter '{name}'")]
    MissingParameter {
        /// The name of the missing parameter.
        name: &'static str,
    },

    /// The `shop` parameter is not a valid shop domain.
    #[error("Invalid shop domain '{shop}'")]
    InvalidShop {
        /// The rejected value.
        shop: String,
    },

    /// The returned state does not match the hash stored in the cookie.
    ///
    /// Also raised when the cookie is absent.
    #[error("Request origin cannot be verified")]
    ForgeryCheckFailed,

    /// The callback signature does not match any configured secret.
    #[error("HMAC signature validation failed")]
    SignatureInvalid,

    /// The anti-forgery token could not be hashed.
    #[error("Failed to hash state parameter: {reason}")]
    StateHashFailed {
        /// The hashing error.
        reason: String,
    },

    /// The platform answered the code exchange with a non-success status or an
    /// unreadable body.
    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchangeFailed {
        /// The HTTP status code returned.
        status: u16,
        /// The error message from the response.
        message: String,
    },

    /// The code exchange request could not be completed (network error or timeout).
    #[error("Token exchange request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl OAuthError {
    /// Returns the HTTP status code reported to the caller for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingParameter { .. } | Self::InvalidShop { .. } | Self::SignatureInvalid => {
                400
            }
            Self::ForgeryCheckFailed => 401,
            Self::StateHashFailed { .. } | Self::TokenExchangeFailed { .. } | Self::Http(_) => 500,
        }
    }
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};
