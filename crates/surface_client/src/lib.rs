//! # surface_client
//!
//! Client side of the pricing-surface pipeline.
//!
//! - [`api_client`]: sends a parameter snapshot to the gateway and maps the
//!   reply into a [`FetchError`] or a parsed surface
//! - [`lifecycle`]: the Idle/Loading/Success/Failed state machine that makes
//!   sure only the most recently triggered fetch updates the state
//! - [`render`]: plain-text heatmaps for terminals
//!
//! ## Binary
//!
//! `surface` fetches one surface through the gateway and prints it.

pub mod api_client;
pub mod error;
pub mod lifecycle;
pub mod render;

pub use error::FetchError;

/// Gateway endpoint used when none is configured
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:3000/api/black-scholes";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::api_client::{PricingRequestClient, SurfaceFetcher};
    pub use crate::error::FetchError;
    pub use crate::lifecycle::{
        Completion, Phase, RequestLifecycleController, SurfaceState, ValidationPolicy,
    };
    pub use surface_core::ParameterModel;
}
