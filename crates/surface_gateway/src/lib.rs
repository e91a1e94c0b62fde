//! CORS-enabled relay for the option pricing engine
//!
//! Browser clients post pricing-surface requests to `/api/black-scholes`;
//! the gateway forwards the contract fields to the configured engine and
//! relays its JSON answer, or a generic error, with permissive cross-origin
//! headers on every response.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

/// Gateway version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
