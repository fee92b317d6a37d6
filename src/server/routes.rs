//! Route handlers.

use axum::extract::{OriginalUri, Query, RawQuery, State};
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::auth::oauth::{begin_auth, validate_auth_callback, CallbackQuery, StateCookie};
use crate::auth::Session;
use crate::proxy::proxy_request;
use crate::server::cookies::{
    clear_cookie, cookie_value, session_cookie, ACCESS_TOKEN_COOKIE, SHOP_COOKIE, STATE_COOKIE,
};
use crate::server::error::ServerError;
use crate::server::state::AppState;

/// Path prefix of the proxied routes.
const API_PREFIX: &str = "/api";

/// Query of `GET /shopify`.
#[derive(Debug, Deserialize)]
pub struct BeginQuery {
    shop: Option<String>,
}

/// `GET /`
pub async fn index() -> &'static str {
    "Hello, world!"
}

/// `GET /shopify?shop=...`: redirect to the consent screen.
pub async fn begin(
    State(state): State<AppState>,
    Query(query): Query<BeginQuery>,
    cookies: Cookies,
) -> Result<Response, ServerError> {
    let started = begin_auth(&state.config, query.shop.as_deref()).await?;
    cookies.add(session_cookie(
        STATE_COOKIE,
        started.state_cookie.to_cookie_value(),
        state.config.secure_cookies(),
    ));

    Ok((StatusCode::FOUND, [(LOCATION, started.auth_url)]).into_response())
}

/// `GET /shopify/callback?...`: verify and exchange, then set session cookies.
///
/// The `state` cookie is cleared whatever the outcome.
pub async fn callback(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
    cookies: Cookies,
) -> Result<&'static str, ServerError> {
    let secure = state.config.secure_cookies();
    let query = CallbackQuery::from_pairs(pairs);
    let state_cookie =
        cookie_value(&cookies, STATE_COOKIE).and_then(|v| StateCookie::from_cookie_value(&v));
    clear_cookie(&cookies, STATE_COOKIE, secure);

    let session =
        validate_auth_callback(&state.config, &state.client, &query, state_cookie.as_ref())
            .await?;

    cookies.add(session_cookie(SHOP_COOKIE, session.shop.as_ref(), secure));
    cookies.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        session.access_token.as_ref(),
        secure,
    ));
    Ok("Authorized!")
}

/// `GET /api`, `GET /api/` and `GET /api/{*route}`: proxy the route.
///
/// The route is taken still percent-encoded from the request path so that
/// the session check runs before any decoding can fail.
pub async fn proxy(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
    cookies: Cookies,
) -> Result<Response, ServerError> {
    let session = Session::from_cookie_values(
        cookie_value(&cookies, SHOP_COOKIE).as_deref(),
        cookie_value(&cookies, ACCESS_TOKEN_COOKIE).as_deref(),
    );
    let route = uri.path().strip_prefix(API_PREFIX).unwrap_or_default();

    let upstream = proxy_request(
        &state.config,
        &state.client,
        session.as_ref(),
        route,
        query.as_deref(),
    )
    .await?;
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| "application/json".to_string());

    Ok(([(CONTENT_TYPE, content_type)], upstream.body).into_response())
}
