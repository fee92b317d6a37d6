//! OAuth authorization URL generation.
//!
//! [`begin_auth`] is the first step of the handshake. It makes a fresh
//! anti-forgery nonce, hashes it for the `state` cookie, and builds the URL
//! the browser is redirected to. No network call is made.

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::handshake::HandshakeState;
use crate::auth::oauth::state::{StateCookie, StateParam};
use crate::config::{ProxyConfig, ShopDomain};

/// Result of initiating OAuth authorization.
///
/// The HTTP layer redirects to `auth_url` and sets `state_cookie` as the
/// `state` cookie. `state` itself is only kept for tests and logging; it must
/// not be persisted anywhere else.
#[derive(Clone, Debug)]
pub struct BeginAuthResult {
    /// The URL to redirect the user to.
    pub auth_url: String,

    /// The shop being authorized.
    pub shop: ShopDomain,

    /// The nonce embedded in `auth_url`.
    pub state: StateParam,

    /// The hashed nonce for the `state` cookie.
    pub state_cookie: StateCookie,
}

/// Initiates the OAuth authorization code flow for `shop`.
///
/// The URL has the form
/// `https://{shop}/admin/oauth/authorize?client_id=..&scope=..&state=..&redirect_uri=..`.
/// Scopes keep their configured order and are comma-joined. Outside
/// production, a configured CORS proxy prefix is put in front of the URL.
///
/// # Errors
///
/// - [`OAuthError::MissingParameter`] if `shop` is absent or empty
/// - [`OAuthError::InvalidShop`] if `shop` is not a valid shop domain
/// - [`OAuthError::StateHashFailed`] if the nonce cannot be hashed
///
/// # Example
///
/// ```rust
/// use shopify_oauth_proxy::{ApiKey, ApiSecretKey, HostUrl, ProxyConfig};
/// use shopify_oauth_proxy::auth::oauth::begin_auth;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let config = ProxyConfig::builder()
///     .api_key(ApiKey::new("api-key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .host(HostUrl::new("https://myapp.example.com").unwrap())
///     .scopes("read_products,write_orders".parse().unwrap())
///     .build()
///     .unwrap();
///
/// let result = begin_auth(&config, Some("test-shop.myshopify.com")).await.unwrap();
/// assert!(result
///     .auth_url
///     .starts_with("https://test-shop.myshopify.com/admin/oauth/authorize?client_id=api-key"));
/// assert!(result.auth_url.contains("scope=read_products,write_orders"));
/// assert!(result.state_cookie.verify(result.state.as_ref()).await);
/// # }
/// ```
pub async fn begin_auth(
    config: &ProxyConfig,
    shop: Option<&str>,
) -> Result<BeginAuthResult, OAuthError> {
    let raw_shop = shop
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(OAuthError::MissingParameter { name: "shop" })?;
    let shop = ShopDomain::new(raw_shop).map_err(|_| OAuthError::InvalidShop {
        shop: raw_shop.to_string(),
    })?;

    let state = StateParam::new();
    let state_cookie = StateCookie::hash(&state).await?;

    // Scope names are restricted to [A-Za-z0-9_], so the list needs no escaping.
    let mut auth_url = format!(
        "https://{}/admin/oauth/authorize?client_id={}&scope={}&state={}&redirect_uri={}",
        shop.as_ref(),
        urlencoding::encode(config.api_key().as_ref()),
        config.scopes(),
        urlencoding::encode(state.as_ref()),
        urlencoding::encode(&config.redirect_uri()),
    );

    if !config.environment().is_production() {
        if let Some(prefix) = config.cors_proxy_url() {
            auth_url = format!("{prefix}{auth_url}");
        }
    }

    HandshakeState::Idle.advance(HandshakeState::AwaitingConsent, shop.as_ref());

    Ok(BeginAuthResult {
        auth_url,
        shop,
        state,
        state_cookie,
    })
}

// Verify BeginAuthResult is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BeginAuthResult>();
};
