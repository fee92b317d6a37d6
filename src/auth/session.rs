//! The credential pair a completed handshake produces.
//!
//! A [`Session`] is never stored server-side. The handshake hands it to the
//! HTTP layer, which writes it into the `shop` and `access_token` cookies, and
//! the proxy rebuilds it from those cookies on every request.

use serde::Deserialize;
use std::fmt;

use crate::config::ShopDomain;

/// An opaque Admin API access token.
///
/// The `Debug` implementation masks the value so tokens never end up in logs.
///
/// ```rust
/// use shopify_oauth_proxy::AccessToken;
///
/// let token = AccessToken::new("shpat_123").unwrap();
/// assert_eq!(token.as_ref(), "shpat_123");
/// assert_eq!(format!("{:?}", token), "AccessToken(*****)");
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a token.
    ///
    /// Returns `None` if the token is empty or contains a byte that is not a
    /// cookie octet (control characters, whitespace, `"`, `,`, `;`, `\` and
    /// non-ASCII), since the token is carried in the `access_token` cookie.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if !token.is_empty() && token.bytes().all(is_cookie_octet) {
            Some(Self(token))
        } else {
            None
        }
    }
}

/// `cookie-octet` from RFC 6265 section 4.1.1.
const fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

impl TryFrom<String> for AccessToken {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("access token is empty or not a valid cookie value")
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(*****)")
    }
}

/// Body of a successful `POST /admin/oauth/access_token`.
///
/// Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    /// The issued token.
    pub access_token: AccessToken,
    /// The comma-separated scopes that were granted.
    #[serde(default)]
    pub scope: Option<String>,
}

/// An authenticated shop together with its access token.
///
/// # Thread Safety
///
/// `Session` is `Send + Sync`, making it safe to share across threads.
///
/// # Example
///
/// ```rust
/// use shopify_oauth_proxy::{AccessToken, Session, ShopDomain};
///
/// let session = Session::new(
///     ShopDomain::new("my-store").unwrap(),
///     AccessToken::new("token").unwrap(),
/// );
/// assert_eq!(session.shop.as_ref(), "my-store.myshopify.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// The shop this session is for.
    pub shop: ShopDomain,

    /// The access token for API authentication.
    pub access_token: AccessToken,
}

impl Session {
    /// Creates a new session.
    #[must_use]
    pub const fn new(shop: ShopDomain, access_token: AccessToken) -> Self {
        Self { shop, access_token }
    }

    /// Rebuilds a session from raw `shop` and `access_token` cookie values.
    ///
    /// Returns `None` if either value is missing, empty, or (for the shop)
    /// not a valid shop domain.
    #[must_use]
    pub fn from_cookie_values(shop: Option<&str>, access_token: Option<&str>) -> Option<Self> {
        let shop = ShopDomain::new(shop?).ok()?;
        let access_token = AccessToken::new(access_token?)?;
        Some(Self::new(shop, access_token))
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_rejects_empty() {
        assert!(AccessToken::new("").is_none());
    }

    #[test]
    fn test_access_token_debug_is_masked() {
        let token = AccessToken::new("shpat_secret").unwrap();
        let debug = format!("{token:?}");
        assert!(!debug.contains("shpat_secret"));
    }

    #[test]
    fn test_session_debug_does_not_leak_token() {
        let session = Session::new(
            ShopDomain::new("shop").unwrap(),
            AccessToken::new("shpat_secret").unwrap(),
        );
        assert!(!format!("{session:?}").contains("shpat_secret"));
    }

    #[test]
    fn test_access_token_response_deserializes() {
        let body = r#"{"access_token":"shpat_abc","scope":"read_orders,write_orders"}"#;
        let response: AccessTokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.access_token.as_ref(), "shpat_abc");
        assert_eq!(response.scope.as_deref(), Some("read_orders,write_orders"));
    }

    #[test]
    fn test_access_token_response_rejects_empty_token() {
        let body = r#"{"access_token":""}"#;
        assert!(serde_json::from_str::<AccessTokenResponse>(body).is_err());
    }

    #[test]
    fn test_access_token_rejects_cookie_delimiters() {
        assert!(AccessToken::new("x; Domain=evil.example").is_none());
        assert!(AccessToken::new("a b").is_none());
        assert!(AccessToken::new("a,b").is_none());
        assert!(AccessToken::new("\"quoted\"").is_none());
        assert!(AccessToken::new("tok\r\nSet-Cookie: x=y").is_none());
        assert!(AccessToken::new("shpat_0123abcDEF-._~").is_some());
    }

    #[test]
    fn test_access_token_response_rejects_unsafe_token() {
        let body = r#"{"access_token":"x; Domain=evil.example; Max-Age=999999999"}"#;
        assert!(serde_json::from_str::<AccessTokenResponse>(body).is_err());
    }

    #[test]
    fn test_from_cookie_values() {
        let session =
            Session::from_cookie_values(Some("my-store.myshopify.com"), Some("tok")).unwrap();
        assert_eq!(session.shop.shop_name(), "my-store");
        assert_eq!(session.access_token.as_ref(), "tok");

        assert!(Session::from_cookie_values(None, Some("tok")).is_none());
        assert!(Session::from_cookie_values(Some("my-store"), None).is_none());
        assert!(Session::from_cookie_values(Some("my-store"), Some("")).is_none());
        assert!(Session::from_cookie_values(Some("evil.example.com"), Some("tok")).is_none());
    }

    #[test]
    fn test_session_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Session>();
    }
}
