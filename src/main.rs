//! `shopify-oauth-proxy` binary.
//!
//! Reads configuration from the environment (and `.env` if present), installs
//! the tracing subscriber and serves until interrupted.

use std::process::ExitCode;

use shopify_oauth_proxy::{server, ProxyConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the variables may come from the environment
    let dotenv = dotenvy::dotenv();

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopify_oauth_proxy=info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config = match ProxyConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match server::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
