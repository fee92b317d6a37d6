//! # Shopify OAuth Proxy
//!
//! A small HTTP service that installs an app on a Shopify store through the
//! OAuth authorization code flow and then proxies read-only Admin REST API
//! calls for the browser, attaching the obtained access token.
//!
//! ## Overview
//!
//! - Type-safe configuration via [`ProxyConfig`] and [`ProxyConfigBuilder`],
//!   loadable from the environment
//! - Validated newtypes for API credentials and domain values
//! - The authorization handshake in [`auth::oauth`]: hashed anti-forgery state,
//!   HMAC verification with key rotation, code exchange
//! - The Admin API proxy in [`proxy`]: session cookies, route blacklist,
//!   byte-for-byte relaying
//! - The axum server in [`server`]
//!
//! ## Flow
//!
//! 1. `GET /shopify?shop=my-store.myshopify.com` sets a `state` cookie and
//!    redirects to the consent screen.
//! 2. Shopify redirects to `GET /shopify/callback?...`; on success the `shop`
//!    and `access_token` cookies are set.
//! 3. `GET /api/orders?status=any` returns the body of
//!    `https://my-store.myshopify.com/admin/orders.json?status=any`.
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_oauth_proxy::{ApiKey, ApiSecretKey, HostUrl, ProxyConfig};
//! use shopify_oauth_proxy::server::{router, AppState};
//!
//! let config = ProxyConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .host(HostUrl::new("https://your-app.example.com").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let app = router(AppState::new(config).unwrap());
//! # let _ = app;
//! ```
//!
//! ## Thread Safety
//!
//! All public types are `Send + Sync`. The server shares one configuration
//! and one connection pool across requests and keeps no per-client state.

pub mod auth;
pub mod config;
pub mod error;
pub mod proxy;
pub mod server;

// Re-export public types at crate root for convenience
pub use auth::{AccessToken, AuthScopes, Session};
pub use config::{
    ApiKey, ApiSecretKey, Environment, HostUrl, ProxyConfig, ProxyConfigBuilder, ShopDomain,
};
pub use error::ConfigError;

// Re-export handshake and proxy entry points
pub use auth::oauth::{
    begin_auth, validate_auth_callback, BeginAuthResult, CallbackQuery, OAuthError,
};
pub use proxy::{proxy_request, ProxyError};
