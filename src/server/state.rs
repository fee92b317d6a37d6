//! Shared application state.

use std::sync::Arc;

use crate::config::ProxyConfig;

/// State shared by every handler.
///
/// Cloning is cheap: the configuration sits behind an `Arc` and the
/// `reqwest::Client` is itself a handle to one connection pool.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Service configuration.
    pub config: Arc<ProxyConfig>,
    /// Client for every outbound call, bounded by the configured timeout.
    pub client: reqwest::Client,
}

impl AppState {
    /// Builds the state, creating the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.upstream_timeout())
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}

// Verify AppState is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AppState>();
};
