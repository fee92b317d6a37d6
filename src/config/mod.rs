//! Configuration for the OAuth proxy service.
//!
//! # Overview
//!
//! - [`ProxyConfig`]: everything the handshake and proxy components need
//! - [`ProxyConfigBuilder`]: fluent builder that validates required fields
//! - [`Environment`]: development/production switch (CORS behavior)
//! - [`ApiKey`], [`ApiSecretKey`], [`ShopDomain`], [`HostUrl`]: validated newtypes
//!
//! In the binary the configuration is read from the process environment via
//! [`ProxyConfig::from_env`]; tests build it directly with the builder.
//!
//! # Example
//!
//! ```rust
//! use shopify_oauth_proxy::{ApiKey, ApiSecretKey, HostUrl, ProxyConfig};
//!
//! let config = ProxyConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .host(HostUrl::new("https://myapp.example.com").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.redirect_uri(), "https://myapp.example.com/shopify/callback");
//! ```

mod newtypes;

pub use newtypes::{ApiKey, ApiSecretKey, HostUrl, ShopDomain};

use std::str::FromStr;
use std::time::Duration;

use crate::auth::AuthScopes;
use crate::error::ConfigError;

/// Scopes requested during authorization unless overridden.
pub const DEFAULT_SCOPES: &[&str] = &[
    "read_orders",
    "write_orders",
    "read_content",
    "write_content",
    "read_products",
    "write_products",
    "read_themes",
    "write_themes",
];

/// Path of the OAuth callback route, appended to the app host.
pub const CALLBACK_PATH: &str = "/shopify/callback";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 80;

/// Default bound on every outbound call to Shopify.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// Deployment environment.
///
/// Anything other than production enables permissive cross-origin handling
/// on every route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    /// Local development.
    #[default]
    Development,
    /// Production deployment.
    Production,
}

impl Environment {
    /// Returns `true` for [`Environment::Production`].
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" | "test" | "" => Ok(Self::Development),
            other => Err(ConfigError::InvalidEnvVar {
                name: "APP_ENV",
                value: other.to_string(),
                reason: "expected 'production' or 'development'",
            }),
        }
    }
}

/// Service configuration.
///
/// `ProxyConfig` is `Clone`, `Send`, and `Sync`; the server keeps one copy in
/// its shared state.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: AuthScopes,
    host: HostUrl,
    port: u16,
    environment: Environment,
    upstream_timeout: Duration,
    api_base_url: Option<HostUrl>,
    cors_proxy_url: Option<String>,
}

impl ProxyConfig {
    /// Creates a new builder for constructing a `ProxyConfig`.
    #[must_use]
    pub fn builder() -> ProxyConfigBuilder {
        ProxyConfigBuilder::new()
    }

    /// Loads the configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honored.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first missing or invalid variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first missing or invalid variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::MissingEnvVar { name });

        let mut builder = Self::builder()
            .api_key(ApiKey::new(require("SHOPIFY_API_PUBLIC_KEY")?)?)
            .api_secret_key(ApiSecretKey::new(require("SHOPIFY_API_SECRET_KEY")?)?)
            .host(HostUrl::new(require("SHOPIFY_APP_HOST")?)?);

        if let Some(old) = get("SHOPIFY_API_SECRET_KEY_OLD") {
            builder = builder.old_api_secret_key(ApiSecretKey::new(old)?);
        }
        if let Some(scopes) = get("SHOPIFY_SCOPES") {
            builder = builder.scopes(scopes.parse()?);
        }
        if let Some(port) = get("PORT") {
            let port = port.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
                name: "PORT",
                value: port.clone(),
                reason: "expected a port number",
            })?;
            builder = builder.port(port);
        }
        // NODE_ENV is accepted as a fallback for existing .env files
        if let Some(env) = get("APP_ENV").or_else(|| get("NODE_ENV")) {
            builder = builder.environment(env.parse()?);
        }
        if let Some(secs) = get("UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidEnvVar {
                    name: "UPSTREAM_TIMEOUT_SECS",
                    value: secs.clone(),
                    reason: "expected a positive number of seconds",
                })?;
            builder = builder.upstream_timeout(Duration::from_secs(secs));
        }
        if let Some(base) = get("SHOPIFY_API_BASE_URL") {
            builder = builder.api_base_url(HostUrl::new(base)?);
        }
        if let Some(prefix) = get("CORS_PROXY_URL") {
            builder = builder.cors_proxy_url(prefix);
        }

        builder.build()
    }

    /// Returns the API key (OAuth client id).
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key (OAuth client secret).
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the previous API secret key, if configured.
    ///
    /// During key rotation callback signatures made with the old key are
    /// still accepted.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the OAuth scopes requested during authorization.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the app's externally reachable host.
    #[must_use]
    pub const fn host(&self) -> &HostUrl {
        &self.host
    }

    /// Returns the listening port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the deployment environment.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Returns the bound applied to outbound calls.
    #[must_use]
    pub const fn upstream_timeout(&self) -> Duration {
        self.upstream_timeout
    }

    /// Returns the upstream origin override, if configured.
    #[must_use]
    pub const fn api_base_url(&self) -> Option<&HostUrl> {
        self.api_base_url.as_ref()
    }

    /// Returns the prefix put in front of the authorization URL in development.
    #[must_use]
    pub fn cors_proxy_url(&self) -> Option<&str> {
        self.cors_proxy_url.as_deref()
    }

    /// Returns the redirect URI Shopify sends the user back to.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("{}{}", self.host.origin(), CALLBACK_PATH)
    }

    /// Returns the origin server-side calls for `shop` are sent to.
    ///
    /// Normally `https://{shop}`; the configured override replaces it.
    #[must_use]
    pub fn upstream_origin(&self, shop: &ShopDomain) -> String {
        self.api_base_url.as_ref().map_or_else(
            || format!("https://{}", shop.as_ref()),
            |base| base.origin().to_string(),
        )
    }

    /// Returns `true` when cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.host.is_secure()
    }
}

// Verify ProxyConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ProxyConfig>();
};

/// Builder for constructing [`ProxyConfig`] instances.
///
/// Required fields are `api_key`, `api_secret_key` and `host`.
///
/// # Defaults
///
/// - `scopes`: [`DEFAULT_SCOPES`]
/// - `port`: [`DEFAULT_PORT`]
/// - `environment`: [`Environment::Development`]
/// - `upstream_timeout`: [`DEFAULT_UPSTREAM_TIMEOUT`]
/// - `old_api_secret_key`, `api_base_url`, `cors_proxy_url`: `None`
#[derive(Debug, Default)]
pub struct ProxyConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    host: Option<HostUrl>,
    port: Option<u16>,
    environment: Option<Environment>,
    upstream_timeout: Option<Duration>,
    api_base_url: Option<HostUrl>,
    cors_proxy_url: Option<String>,
}

impl ProxyConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the previous API secret key for key rotation support.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets the OAuth scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the app host (required).
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the listening port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the deployment environment.
    #[must_use]
    pub const fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Sets the bound applied to outbound calls.
    #[must_use]
    pub const fn upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = Some(timeout);
        self
    }

    /// Routes server-side calls to this origin instead of `https://{shop}`.
    #[must_use]
    pub fn api_base_url(mut self, base: HostUrl) -> Self {
        self.api_base_url = Some(base);
        self
    }

    /// Sets the prefix for the authorization URL in development.
    #[must_use]
    pub fn cors_proxy_url(mut self, prefix: impl Into<String>) -> Self {
        self.cors_proxy_url = Some(prefix.into());
        self
    }

    /// Builds the [`ProxyConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key`,
    /// `api_secret_key` or `host` are not set.
    pub fn build(self) -> Result<ProxyConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;
        let host = self
            .host
            .ok_or(ConfigError::MissingRequiredField { field: "host" })?;

        Ok(ProxyConfig {
            api_key,
            api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            scopes: self
                .scopes
                .unwrap_or_else(|| AuthScopes::from_list(DEFAULT_SCOPES)),
            host,
            port: self.port.unwrap_or(DEFAULT_PORT),
            environment: self.environment.unwrap_or_default(),
            upstream_timeout: self.upstream_timeout.unwrap_or(DEFAULT_UPSTREAM_TIMEOUT),
            api_base_url: self.api_base_url,
            cors_proxy_url: self.cors_proxy_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn minimal_builder() -> ProxyConfigBuilder {
        ProxyConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .host(HostUrl::new("https://myapp.example.com").unwrap())
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_builder_requires_api_key() {
        let result = ProxyConfigBuilder::new()
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .host(HostUrl::new("https://a.example.com").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "api_key" })
        ));
    }

    #[test]
    fn test_builder_requires_host() {
        let result = ProxyConfigBuilder::new()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "host" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = minimal_builder().build().unwrap();

        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.environment(), Environment::Development);
        assert_eq!(config.upstream_timeout(), DEFAULT_UPSTREAM_TIMEOUT);
        assert_eq!(config.scopes().to_string(), DEFAULT_SCOPES.join(","));
        assert!(config.old_api_secret_key().is_none());
        assert!(config.api_base_url().is_none());
        assert!(config.cors_proxy_url().is_none());
    }

    #[test]
    fn test_redirect_uri_uses_callback_path() {
        let config = ProxyConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .host(HostUrl::new("https://myapp.example.com/").unwrap())
            .build()
            .unwrap();

        assert_eq!(
            config.redirect_uri(),
            "https://myapp.example.com/shopify/callback"
        );
    }

    #[test]
    fn test_upstream_origin_defaults_to_shop() {
        let config = minimal_builder().build().unwrap();
        let shop = ShopDomain::new("test-shop").unwrap();
        assert_eq!(
            config.upstream_origin(&shop),
            "https://test-shop.myshopify.com"
        );
    }

    #[test]
    fn test_upstream_origin_honors_override() {
        let config = minimal_builder()
            .api_base_url(HostUrl::new("http://127.0.0.1:9999/").unwrap())
            .build()
            .unwrap();
        let shop = ShopDomain::new("test-shop").unwrap();
        assert_eq!(config.upstream_origin(&shop), "http://127.0.0.1:9999");
    }

    #[test]
    fn test_secure_cookies_follow_host_scheme() {
        assert!(minimal_builder().build().unwrap().secure_cookies());

        let config = minimal_builder()
            .host(HostUrl::new("http://localhost:3000").unwrap())
            .build()
            .unwrap();
        assert!(!config.secure_cookies());
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "Development".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let config = ProxyConfig::from_lookup(lookup(&[
            ("SHOPIFY_API_PUBLIC_KEY", "public"),
            ("SHOPIFY_API_SECRET_KEY", "secret"),
            ("SHOPIFY_API_SECRET_KEY_OLD", "old-secret"),
            ("SHOPIFY_APP_HOST", "https://app.example.com"),
            ("SHOPIFY_SCOPES", "read_orders,read_products"),
            ("PORT", "8080"),
            ("APP_ENV", "production"),
            ("UPSTREAM_TIMEOUT_SECS", "3"),
            ("SHOPIFY_API_BASE_URL", "http://localhost:9000"),
            ("CORS_PROXY_URL", "https://cors.example.com/"),
        ]))
        .unwrap();

        assert_eq!(config.api_key().as_ref(), "public");
        assert_eq!(config.api_secret_key().as_ref(), "secret");
        assert_eq!(config.old_api_secret_key().unwrap().as_ref(), "old-secret");
        assert_eq!(config.scopes().to_string(), "read_orders,read_products");
        assert_eq!(config.port(), 8080);
        assert!(config.environment().is_production());
        assert_eq!(config.upstream_timeout(), Duration::from_secs(3));
        assert_eq!(
            config.api_base_url().unwrap().as_ref(),
            "http://localhost:9000"
        );
        assert_eq!(config.cors_proxy_url(), Some("https://cors.example.com/"));
    }

    #[test]
    fn test_from_lookup_falls_back_to_node_env() {
        let base = [
            ("SHOPIFY_API_PUBLIC_KEY", "public"),
            ("SHOPIFY_API_SECRET_KEY", "secret"),
            ("SHOPIFY_APP_HOST", "https://app.example.com"),
        ];

        let mut vars = base.to_vec();
        vars.push(("NODE_ENV", "production"));
        let config = ProxyConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(config.environment().is_production());

        vars.push(("APP_ENV", "development"));
        let config = ProxyConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(!config.environment().is_production());
    }

    #[test]
    fn test_from_lookup_reports_missing_variable() {
        let result = ProxyConfig::from_lookup(lookup(&[
            ("SHOPIFY_API_PUBLIC_KEY", "public"),
            ("SHOPIFY_API_SECRET_KEY", "secret"),
        ]));

        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingEnvVar {
                name: "SHOPIFY_APP_HOST"
            }
        );
    }

    #[test]
    fn test_from_lookup_treats_empty_values_as_unset() {
        let result = ProxyConfig::from_lookup(lookup(&[
            ("SHOPIFY_API_PUBLIC_KEY", ""),
            ("SHOPIFY_API_SECRET_KEY", "secret"),
            ("SHOPIFY_APP_HOST", "https://app.example.com"),
        ]));

        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingEnvVar {
                name: "SHOPIFY_API_PUBLIC_KEY"
            }
        );
    }

    #[test]
    fn test_from_lookup_rejects_bad_port() {
        let result = ProxyConfig::from_lookup(lookup(&[
            ("SHOPIFY_API_PUBLIC_KEY", "public"),
            ("SHOPIFY_API_SECRET_KEY", "secret"),
            ("SHOPIFY_APP_HOST", "https://app.example.com"),
            ("PORT", "eighty"),
        ]));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar { name: "PORT", .. })
        ));
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProxyConfig>();
    }
}
