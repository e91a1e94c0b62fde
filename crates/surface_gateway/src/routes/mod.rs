//! Route modules for the surface gateway
//!
//! - relay: the `/api/black-scholes` pricing relay
//! - health: health check and readiness probes

pub mod health;
pub mod relay;

use axum::http::{header, HeaderValue};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub const CORS_ALLOW_CREDENTIALS: &str = "true";
pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "GET,OPTIONS,PATCH,DELETE,POST,PUT";
pub const CORS_ALLOW_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, Content-Length, Content-MD5, Content-Type, Date, X-Api-Version";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved pricing engine endpoint
    pub engine_url: Arc<str>,
    /// Pooled client for upstream calls
    pub http: reqwest::Client,
    /// Start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create a new AppState
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            engine_url: Arc::from(config.engine_url()),
            http: reqwest::Client::new(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Build the main application router by merging all route modules.
///
/// The CORS headers are fixed and written onto every response, including
/// errors and unknown routes.
pub fn build_router(config: &ServerConfig) -> Router {
    let state = AppState::new(config);

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static(CORS_ALLOW_CREDENTIALS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ));

    Router::new()
        .merge(health::routes())
        .merge(relay::routes())
        .with_state(state)
        .layer(middleware)
}
