//! Session cookie names and attributes.
//!
//! Cookies are read and written through [`tower_cookies::Cookies`]; the
//! router installs the `CookieManagerLayer`. Every cookie is `Path=/`,
//! `HttpOnly` and `SameSite=Lax`, plus `Secure` when the app is served over
//! `https`.

use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

/// Holds the hashed anti-forgery nonce between redirect and callback.
pub const STATE_COOKIE: &str = "state";

/// Holds the authorized shop domain.
pub const SHOP_COOKIE: &str = "shop";

/// Holds the Admin API access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Builds a session cookie with the shared attributes.
#[must_use]
pub fn session_cookie(name: &'static str, value: impl Into<String>, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value.into()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Returns the value of cookie `name`. Empty values count as absent.
#[must_use]
pub fn cookie_value(cookies: &Cookies, name: &str) -> Option<String> {
    cookies
        .get(name)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}

/// Expires cookie `name` in the browser if the request carried it.
pub fn clear_cookie(cookies: &Cookies, name: &'static str, secure: bool) {
    cookies.remove(session_cookie(name, "", secure));
}
