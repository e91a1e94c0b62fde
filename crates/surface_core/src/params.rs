//! User-editable pricing parameters.
//!
//! [`ParameterModel`] holds the inputs a user picks before requesting a
//! surface. Setters only coerce types; consistency checks live in
//! [`ParameterModel::validate`] and are applied by the caller at
//! submission time.

use chrono::{Duration, Local, NaiveDate};

use crate::error::ValidationError;
use crate::wire::PricingSurfaceRequest;

/// Ticker used when nothing else was chosen
pub const DEFAULT_TICKER: &str = "AAPL";
/// Default time to maturity in years
pub const DEFAULT_TIME_TO_MATURITY: f64 = 1.0;
/// Default annualised risk-free rate as a decimal fraction
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.01;
/// Length of the default historical window in days
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Wire format for dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current pricing inputs.
///
/// Optional fields left as `None` are resolved by the pricing engine:
/// an absent strike prices at the money, absent spot bounds select a
/// range around the current price.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterModel {
    ticker: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    strike_price: Option<f64>,
    time_to_maturity: f64,
    risk_free_rate: f64,
    min_spot_price: Option<f64>,
    max_spot_price: Option<f64>,
}

impl Default for ParameterModel {
    fn default() -> Self {
        Self::with_end_date(Local::now().date_naive())
    }
}

impl ParameterModel {
    /// Create a model with default values and a window ending today
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model with default values and a trailing window ending at `end_date`
    pub fn with_end_date(end_date: NaiveDate) -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            start_date: end_date - Duration::days(DEFAULT_WINDOW_DAYS),
            end_date,
            strike_price: None,
            time_to_maturity: DEFAULT_TIME_TO_MATURITY,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            min_spot_price: None,
            max_spot_price: None,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn set_ticker(&mut self, ticker: impl Into<String>) {
        self.ticker = ticker.into();
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn set_start_date(&mut self, date: NaiveDate) {
        self.start_date = date;
    }

    /// Set the start date from `YYYY-MM-DD` text
    pub fn set_start_date_text(&mut self, text: &str) -> Result<(), chrono::ParseError> {
        self.start_date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)?;
        Ok(())
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn set_end_date(&mut self, date: NaiveDate) {
        self.end_date = date;
    }

    /// Set the end date from `YYYY-MM-DD` text
    pub fn set_end_date_text(&mut self, text: &str) -> Result<(), chrono::ParseError> {
        self.end_date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)?;
        Ok(())
    }

    pub fn strike_price(&self) -> Option<f64> {
        self.strike_price
    }

    pub fn set_strike_price(&mut self, strike: Option<f64>) {
        self.strike_price = strike;
    }

    /// Set the strike from raw input; empty input clears it
    pub fn set_strike_price_text(&mut self, text: &str) {
        self.strike_price = coerce_optional(text);
    }

    pub fn time_to_maturity(&self) -> f64 {
        self.time_to_maturity
    }

    pub fn set_time_to_maturity(&mut self, years: f64) {
        self.time_to_maturity = years;
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn set_risk_free_rate(&mut self, rate: f64) {
        self.risk_free_rate = rate;
    }

    pub fn min_spot_price(&self) -> Option<f64> {
        self.min_spot_price
    }

    pub fn set_min_spot_price(&mut self, spot: Option<f64>) {
        self.min_spot_price = spot;
    }

    /// Set the lower spot bound from raw input; empty input clears it
    pub fn set_min_spot_price_text(&mut self, text: &str) {
        self.min_spot_price = coerce_optional(text);
    }

    pub fn max_spot_price(&self) -> Option<f64> {
        self.max_spot_price
    }

    pub fn set_max_spot_price(&mut self, spot: Option<f64>) {
        self.max_spot_price = spot;
    }

    /// Set the upper spot bound from raw input; empty input clears it
    pub fn set_max_spot_price_text(&mut self, text: &str) {
        self.max_spot_price = coerce_optional(text);
    }

    /// Check the parameter combination for consistency.
    ///
    /// Returns the first violation found, in field order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ticker.trim().is_empty() {
            return Err(ValidationError::EmptyTicker);
        }
        if self.start_date > self.end_date {
            return Err(ValidationError::InvertedDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if let Some(strike) = self.strike_price {
            if strike.is_nan() || strike <= 0.0 {
                return Err(ValidationError::NonPositiveStrike(strike));
            }
        }
        if self.time_to_maturity.is_nan() || self.time_to_maturity <= 0.0 {
            return Err(ValidationError::NonPositiveMaturity(self.time_to_maturity));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(ValidationError::NonFiniteRate(self.risk_free_rate));
        }
        for spot in [self.min_spot_price, self.max_spot_price].into_iter().flatten() {
            if spot.is_nan() || spot <= 0.0 {
                return Err(ValidationError::NonPositiveSpot(spot));
            }
        }
        if let (Some(min), Some(max)) = (self.min_spot_price, self.max_spot_price) {
            if min >= max {
                return Err(ValidationError::InvertedSpotBounds { min, max });
            }
        }
        Ok(())
    }

    /// Freeze the current values into a request payload
    pub fn to_request(&self) -> PricingSurfaceRequest {
        PricingSurfaceRequest::from(self)
    }
}

impl From<&ParameterModel> for PricingSurfaceRequest {
    fn from(model: &ParameterModel) -> Self {
        PricingSurfaceRequest {
            stock: model.ticker.clone(),
            start_date: model.start_date,
            end_date: model.end_date,
            strike_price: model.strike_price,
            time_to_maturity: model.time_to_maturity,
            risk_free_rate: model.risk_free_rate,
            min_spot_price: model.min_spot_price,
            max_spot_price: model.max_spot_price,
        }
    }
}

/// Empty or unparseable numeric input means "not supplied", never zero.
fn coerce_optional(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
