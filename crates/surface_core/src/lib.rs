//! # surface_core: Data Model for Option Pricing Surfaces
//!
//! ## Role
//!
//! surface_core is the bottom layer of the workspace. It holds no I/O and
//! provides:
//! - The user-editable parameter set (`params::ParameterModel`)
//! - The wire contract shared by client, gateway and pricing engine (`wire`)
//! - Conversion of surface rows into heatmap series (`heatmap`)
//! - Display formatting of the priced scenario (`summary`)
//! - Error types: `ValidationError`, `SurfaceError` (`error`)
//!
//! ## Usage Examples
//!
//! ```rust
//! use surface_core::heatmap::to_series;
//! use surface_core::wire::SurfaceRow;
//!
//! let row: SurfaceRow = serde_json::from_str(
//!     r#"{"id": "0.2", "100": 5.1, "150": 10.2, "200": 20.5}"#,
//! ).unwrap();
//!
//! let series = to_series(&[row]);
//! assert_eq!(series[0].id, "0.2");
//! assert_eq!(series[0].points[1].x, "150");
//! assert_eq!(series[0].points[1].y, 10.2);
//! ```

pub mod error;
pub mod heatmap;
pub mod params;
pub mod summary;
pub mod wire;

pub use error::{SurfaceError, ValidationError};
pub use heatmap::{to_series, HeatmapPoint, HeatmapSeries};
pub use params::ParameterModel;
pub use summary::ScenarioSummary;
pub use wire::{Cell, PricingSurfaceRequest, PricingSurfaceResponse, SurfaceRow};
