//! Error types for structured error handling.
//!
//! This module provides:
//! - `ValidationError`: Inconsistent parameter combinations caught before submission
//! - `SurfaceError`: Malformed surface rows returned by the pricing engine

use chrono::NaiveDate;
use thiserror::Error;

/// Parameter validation failures.
///
/// Raised by [`ParameterModel::validate`](crate::params::ParameterModel::validate).
/// Whether a failure blocks a fetch is a policy of the caller.
///
/// # Examples
/// ```
/// use surface_core::ValidationError;
///
/// let err = ValidationError::InvertedSpotBounds { min: 200.0, max: 100.0 };
/// assert_eq!(
///     format!("{}", err),
///     "Minimum spot price 200 must be below maximum spot price 100"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Ticker is empty or whitespace
    #[error("Ticker must not be empty")]
    EmptyTicker,

    /// Start date falls after end date
    #[error("Start date {start} must not be after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    /// Strike price present but not strictly positive
    #[error("Strike price must be positive, got {0}")]
    NonPositiveStrike(f64),

    /// Time to maturity not strictly positive
    #[error("Time to maturity must be positive, got {0}")]
    NonPositiveMaturity(f64),

    /// A spot price bound present but not strictly positive
    #[error("Spot price bounds must be positive, got {0}")]
    NonPositiveSpot(f64),

    /// Both spot bounds present with min >= max
    #[error("Minimum spot price {min} must be below maximum spot price {max}")]
    InvertedSpotBounds { min: f64, max: f64 },

    /// Risk-free rate is NaN or infinite
    #[error("Risk-free rate must be a finite number, got {0}")]
    NonFiniteRate(f64),
}

/// Surface shape errors.
///
/// Rows of one surface must carry an `id` and share a single set of
/// column labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// Row object has no `id` key
    #[error("Surface row is missing its id")]
    MissingId,

    /// Row `id` is neither a string nor a number
    #[error("Surface row id must be a string or number, got {0}")]
    InvalidId(String),

    /// Row has a different number of columns than the first row
    #[error("Surface row {row} has {found} columns, expected {expected}")]
    ColumnCountMismatch {
        row: String,
        expected: usize,
        found: usize,
    },

    /// Row carries a column label the first row does not
    #[error("Surface row {row} has unexpected column {column}")]
    UnknownColumn { row: String, column: String },
}
