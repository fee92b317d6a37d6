//! HTTP server.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | [`routes::index`] |
//! | `GET /shopify`, `GET /authorize` | [`routes::begin`] |
//! | `GET /shopify/callback` | [`routes::callback`] |
//! | `GET /api`, `GET /api/`, `GET /api/{*route}` | [`routes::proxy`] |
//!
//! The `/api` routes always answer cross-origin requests from any origin with
//! credentials allowed. Outside production the other routes do the same.

pub mod cookies;
mod error;
pub mod routes;
mod state;

pub use error::{ServerError, StartupError};
pub use state::AppState;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::{ProxyConfig, CALLBACK_PATH};

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let mut handshake = Router::new()
        .route("/", get(routes::index))
        .route("/shopify", get(routes::begin))
        .route("/authorize", get(routes::begin))
        .route(CALLBACK_PATH, get(routes::callback));
    if !state.config.environment().is_production() {
        handshake = handshake.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods([Method::GET])
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true),
        );
    }

    let api = Router::new()
        .route("/api", get(routes::proxy))
        .route("/api/", get(routes::proxy))
        .route("/api/{*route}", get(routes::proxy))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods([Method::GET])
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true),
        );

    handshake
        .merge(api)
        .layer(CookieManagerLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Binds `0.0.0.0:{port}` and serves until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns [`StartupError`] if the HTTP client cannot be built or the port
/// cannot be bound.
pub async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port()));
    let environment = config.environment();
    let state = AppState::new(config)?;

    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(addr = %local_addr, environment = ?environment, "Starting OAuth proxy server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
