//! OAuth callback validation and token exchange.
//!
//! After the merchant approves the app, Shopify redirects the browser to the
//! callback route with `shop`, `code`, `state`, `hmac` and a few other
//! parameters. [`validate_auth_callback`] checks, in this order:
//!
//! 1. the returned `state` matches the hash in the `state` cookie
//! 2. `shop`, `code` and `hmac` are present
//! 3. the `hmac` signs the other parameters
//! 4. the shop is a valid shop domain
//!
//! and only then exchanges the code for an access token. A failed check stops
//! the handshake without any outbound call.

use serde::Serialize;

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::handshake::HandshakeState;
use crate::auth::oauth::hmac::validate_hmac;
use crate::auth::oauth::{CallbackQuery, StateCookie};
use crate::auth::session::AccessTokenResponse;
use crate::auth::Session;
use crate::config::{ProxyConfig, ShopDomain};

/// Request body for the code exchange.
#[derive(Serialize)]
struct AccessTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Validates an OAuth callback and exchanges the code for an access token.
///
/// `client` should carry the configured upstream timeout; the server builds
/// one shared client for this. `state_cookie` is the decoded `state` cookie,
/// or `None` if the browser did not send one.
///
/// # Errors
///
/// - [`OAuthError::ForgeryCheckFailed`]: no `state`, no cookie, or `state`
///   does not match the cookie
/// - [`OAuthError::MissingParameter`]: `shop`, `code` or `hmac` absent
/// - [`OAuthError::SignatureInvalid`]: `hmac` matches neither configured secret
/// - [`OAuthError::InvalidShop`]: `shop` is not a valid shop domain
/// - [`OAuthError::Http`]: the exchange request failed or timed out
/// - [`OAuthError::TokenExchangeFailed`]: non-2xx or unreadable exchange response
pub async fn validate_auth_callback(
    config: &ProxyConfig,
    client: &reqwest::Client,
    query: &CallbackQuery,
    state_cookie: Option<&StateCookie>,
) -> Result<Session, OAuthError> {
    let handshake = HandshakeState::AwaitingConsent;
    let fail = |error: OAuthError| {
        let shop = query.shop().unwrap_or_default();
        tracing::warn!(shop, error = %error, "rejecting OAuth callback");
        handshake.advance(HandshakeState::Failed, shop);
        error
    };

    let verified = match (query.state(), state_cookie) {
        (Some(state), Some(cookie)) => cookie.verify(state).await,
        _ => false,
    };
    if !verified {
        return Err(fail(OAuthError::ForgeryCheckFailed));
    }

    let raw_shop = query
        .shop()
        .ok_or_else(|| fail(OAuthError::MissingParameter { name: "shop" }))?;
    let code = query
        .code()
        .ok_or_else(|| fail(OAuthError::MissingParameter { name: "code" }))?;
    if query.hmac().is_none() {
        return Err(fail(OAuthError::MissingParameter { name: "hmac" }));
    }

    if !validate_hmac(query, config) {
        return Err(fail(OAuthError::SignatureInvalid));
    }

    let shop = ShopDomain::new(raw_shop).map_err(|_| {
        fail(OAuthError::InvalidShop {
            shop: raw_shop.to_string(),
        })
    })?;

    let handshake = handshake.advance(HandshakeState::AwaitingExchange, shop.as_ref());

    match exchange_code(config, client, &shop, code).await {
        Ok(response) => {
            handshake.advance(HandshakeState::Authorized, shop.as_ref());
            tracing::debug!(
                shop = %shop,
                granted_scope = response.scope.as_deref().unwrap_or_default(),
                "access token issued"
            );
            Ok(Session::new(shop, response.access_token))
        }
        Err(error) => {
            tracing::error!(shop = %shop, error = %error, "token exchange failed");
            handshake.advance(HandshakeState::Failed, shop.as_ref());
            Err(error)
        }
    }
}

async fn exchange_code(
    config: &ProxyConfig,
    client: &reqwest::Client,
    shop: &ShopDomain,
    code: &str,
) -> Result<AccessTokenResponse, OAuthError> {
    let token_url = format!("{}/admin/oauth/access_token", config.upstream_origin(shop));

    let request_body = AccessTokenRequest {
        client_id: config.api_key().as_ref(),
        client_secret: config.api_secret_key().as_ref(),
        code,
    };

    let response = client.post(&token_url).json(&request_body).send().await?;
    let status = response.status();

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(OAuthError::TokenExchangeFailed {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| OAuthError::TokenExchangeFailed {
            status: status.as_u16(),
            message: format!("Failed to parse token response: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::oauth::hmac::compute_signature;
    use crate::auth::oauth::StateParam;
    use crate::config::{ApiKey, ApiSecretKey, HostUrl};
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SHOP: &str = "test-shop.myshopify.com";

    fn create_test_config(base: &str) -> ProxyConfig {
        ProxyConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .host(HostUrl::new("https://myapp.example.com").unwrap())
            .api_base_url(HostUrl::new(base).unwrap())
            .build()
            .unwrap()
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap()
    }

    fn signed_query(state: &str, secret: &str) -> CallbackQuery {
        let mut pairs = vec![
            ("code".to_string(), "auth-code-123".to_string()),
            ("host".to_string(), "dGVzdC1ob3N0".to_string()),
            ("shop".to_string(), SHOP.to_string()),
            ("state".to_string(), state.to_string()),
            ("timestamp".to_string(), "1700000000".to_string()),
        ];
        let signable = CallbackQuery::from_pairs(pairs.clone()).to_signable_string();
        pairs.push((
            "hmac".to_string(),
            compute_signature(&signable, secret).unwrap(),
        ));
        CallbackQuery::from_pairs(pairs)
    }

    async fn state_pair() -> (StateParam, StateCookie) {
        let state = StateParam::new();
        let cookie = StateCookie::hash(&state).await.unwrap();
        (state, cookie)
    }

    #[tokio::test]
    async fn test_valid_callback_exchanges_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/oauth/access_token"))
            .and(body_json(serde_json::json!({
                "client_id": "test-api-key",
                "client_secret": "test-secret",
                "code": "auth-code-123"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "shpat_token",
                "scope": "read_orders"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri());
        let (state, cookie) = state_pair().await;
        let query = signed_query(state.as_ref(), "test-secret");

        let session = validate_auth_callback(&config, &client(), &query, Some(&cookie))
            .await
            .unwrap();

        assert_eq!(session.shop.as_ref(), SHOP);
        assert_eq!(session.access_token.as_ref(), "shpat_token");
    }

    #[tokio::test]
    async fn test_missing_parameters_are_reported_by_name() {
        let config = create_test_config("http://127.0.0.1:1");
        let (state, cookie) = state_pair().await;
        let query = CallbackQuery::from_pairs(vec![
            ("shop".to_string(), SHOP.to_string()),
            ("state".to_string(), state.to_string()),
        ]);

        let result = validate_auth_callback(&config, &client(), &query, Some(&cookie)).await;
        assert!(matches!(
            result,
            Err(OAuthError::MissingParameter { name: "code" })
        ));
    }

    #[tokio::test]
    async fn test_forged_state_wins_over_missing_parameters() {
        let config = create_test_config("http://127.0.0.1:1");
        let (_, cookie) = state_pair().await;
        let query = CallbackQuery::from_pairs(vec![
            ("code".to_string(), "c".to_string()),
            ("shop".to_string(), SHOP.to_string()),
            ("state".to_string(), "FORGED".to_string()),
        ]);

        let result = validate_auth_callback(&config, &client(), &query, Some(&cookie)).await;
        assert!(matches!(result, Err(OAuthError::ForgeryCheckFailed)));
    }

    #[tokio::test]
    async fn test_missing_state_fails_forgery_check() {
        let config = create_test_config("http://127.0.0.1:1");
        let (_, cookie) = state_pair().await;
        let query = CallbackQuery::from_pairs(vec![("shop".to_string(), SHOP.to_string())]);

        let result = validate_auth_callback(&config, &client(), &query, Some(&cookie)).await;
        assert!(matches!(result, Err(OAuthError::ForgeryCheckFailed)));
    }

    #[tokio::test]
    async fn test_state_mismatch_fails_before_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri());
        let (_, cookie) = state_pair().await;
        let query = signed_query("forged-state", "test-secret");

        let result = validate_auth_callback(&config, &client(), &query, Some(&cookie)).await;
        assert!(matches!(result, Err(OAuthError::ForgeryCheckFailed)));
    }

    #[tokio::test]
    async fn test_missing_cookie_fails_forgery_check() {
        let config = create_test_config("http://127.0.0.1:1");
        let (state, _) = state_pair().await;
        let query = signed_query(state.as_ref(), "test-secret");

        let result = validate_auth_callback(&config, &client(), &query, None).await;
        assert!(matches!(result, Err(OAuthError::ForgeryCheckFailed)));
    }

    #[tokio::test]
    async fn test_forgery_check_runs_before_signature_check() {
        let config = create_test_config("http://127.0.0.1:1");
        let (_, cookie) = state_pair().await;
        let query = signed_query("forged-state", "wrong-secret");

        let result = validate_auth_callback(&config, &client(), &query, Some(&cookie)).await;
        assert!(matches!(result, Err(OAuthError::ForgeryCheckFailed)));
    }

    #[tokio::test]
    async fn test_bad_signature_fails_before_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri());
        let (state, cookie) = state_pair().await;
        let query = signed_query(state.as_ref(), "wrong-secret");

        let result = validate_auth_callback(&config, &client(), &query, Some(&cookie)).await;
        assert!(matches!(result, Err(OAuthError::SignatureInvalid)));
    }

    #[tokio::test]
    async fn test_exchange_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/oauth/access_token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid code"))
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri());
        let (state, cookie) = state_pair().await;
        let query = signed_query(state.as_ref(), "test-secret");

        let result = validate_auth_callback(&config, &client(), &query, Some(&cookie)).await;
        match result {
            Err(OAuthError::TokenExchangeFailed { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "invalid code");
            }
            other => panic!("expected TokenExchangeFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_unparseable_body_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri());
        let (state, cookie) = state_pair().await;
        let query = signed_query(state.as_ref(), "test-secret");

        let result = validate_auth_callback(&config, &client(), &query, Some(&cookie)).await;
        assert!(matches!(
            result,
            Err(OAuthError::TokenExchangeFailed { status: 200, .. })
        ));
    }

    #[tokio::test]
    async fn test_exchange_timeout_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "late" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri());
        let (state, cookie) = state_pair().await;
        let query = signed_query(state.as_ref(), "test-secret");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        let result = validate_auth_callback(&config, &client, &query, Some(&cookie)).await;
        assert!(matches!(result, Err(OAuthError::Http(_))));
    }
}
