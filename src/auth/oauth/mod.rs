//! OAuth 2.0 authorization code handshake with Shopify.
//!
//! 1. **Authorization initiation** ([`begin_auth`]): make an anti-forgery
//!    nonce, hash it for the `state` cookie, and build the consent URL.
//! 2. **Callback validation** ([`validate_auth_callback`]): check the nonce
//!    against the cookie, check the signature, and exchange the code for an
//!    access token.
//!
//! # Security Features
//!
//! - **Forgery protection**: the nonce travels in the URL and only its Argon2id
//!   hash in the cookie; no server-side copy exists, so concurrent handshakes
//!   from different browsers cannot interfere.
//! - **HMAC validation**: callbacks are verified with HMAC-SHA256 and
//!   constant-time comparison.
//! - **Key rotation**: an old API secret key is accepted as a fallback.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_oauth_proxy::auth::oauth::{begin_auth, validate_auth_callback, CallbackQuery};
//!
//! // GET /shopify?shop=...
//! let started = begin_auth(&config, Some("example-shop.myshopify.com")).await?;
//! // Set `state` cookie to started.state_cookie.to_cookie_value()
//! // and redirect to started.auth_url
//!
//! // GET /shopify/callback?...
//! let query = CallbackQuery::from_pairs(pairs);
//! let session = validate_auth_callback(&config, &client, &query, cookie.as_ref()).await?;
//! ```

mod auth_query;
mod begin_auth;
mod error;
mod handshake;
pub mod hmac;
mod state;
mod validate_callback;

pub use auth_query::CallbackQuery;
pub use begin_auth::{begin_auth, BeginAuthResult};
pub use error::OAuthError;
pub use handshake::HandshakeState;
pub use hmac::{compute_signature, constant_time_compare, validate_hmac};
pub use state::{StateCookie, StateParam};
pub use validate_callback::validate_auth_callback;
