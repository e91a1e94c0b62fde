//! Display strings for the priced scenario.

use std::fmt;

use crate::wire::PricingSurfaceResponse;

/// Placeholder for values the engine did not report sensibly
pub const NOT_AVAILABLE: &str = "N/A";

/// The scalar half of a response, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSummary {
    pub stock_price: String,
    pub implied_volatility: String,
    pub strike_price: String,
    pub time_to_maturity: String,
    pub risk_free_rate: String,
}

impl From<&PricingSurfaceResponse> for ScenarioSummary {
    fn from(response: &PricingSurfaceResponse) -> Self {
        Self {
            stock_price: money(response.stock_price),
            implied_volatility: percent(response.implied_volatility),
            strike_price: money(response.strike_price),
            time_to_maturity: finite(response.time_to_maturity)
                .map(|v| format!("{:.2} years", v))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            risk_free_rate: percent(response.risk_free_rate),
        }
    }
}

impl fmt::Display for ScenarioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Stock Price: {}", self.stock_price)?;
        writeln!(f, "Implied Volatility: {}", self.implied_volatility)?;
        writeln!(f, "Strike Price: {}", self.strike_price)?;
        writeln!(f, "Time to Maturity: {}", self.time_to_maturity)?;
        write!(f, "Risk-Free Rate: {}", self.risk_free_rate)
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn money(value: f64) -> String {
    finite(value)
        .map(|v| format!("${:.2}", v))
        .unwrap_or_else(|| format!("${}", NOT_AVAILABLE))
}

fn percent(fraction: f64) -> String {
    finite(fraction)
        .map(|v| format!("{:.2}%", v * 100.0))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
