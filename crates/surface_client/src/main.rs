//! Surface CLI
//!
//! Fetches one option pricing surface through the gateway and prints the
//! priced scenario together with call and put heatmaps.

use anyhow::{Context, Result};
use clap::Parser;
use surface_client::prelude::*;
use surface_client::render::render_state;
use surface_client::DEFAULT_GATEWAY_URL;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Option pricing surface client
#[derive(Parser, Debug)]
#[command(name = "surface")]
#[command(version, about, long_about = None)]
struct Args {
    /// Gateway endpoint URL
    #[arg(long, env = "SURFACE_GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL)]
    gateway_url: String,

    /// Underlying ticker
    #[arg(long, default_value = surface_core::params::DEFAULT_TICKER)]
    stock: String,

    /// Start of the historical window (YYYY-MM-DD), defaults to 30 days before end
    #[arg(long)]
    start_date: Option<String>,

    /// End of the historical window (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end_date: Option<String>,

    /// Strike price; omitted prices at the money
    #[arg(long, default_value = "")]
    strike_price: String,

    /// Time to maturity in years
    #[arg(long, default_value_t = surface_core::params::DEFAULT_TIME_TO_MATURITY)]
    time_to_maturity: f64,

    /// Risk-free rate as a decimal fraction
    #[arg(long, default_value_t = surface_core::params::DEFAULT_RISK_FREE_RATE, allow_negative_numbers = true)]
    risk_free_rate: f64,

    /// Lower bound of the spot axis
    #[arg(long, default_value = "")]
    min_spot_price: String,

    /// Upper bound of the spot axis
    #[arg(long, default_value = "")]
    max_spot_price: String,

    /// Reject inconsistent parameters instead of sending them
    #[arg(long)]
    strict: bool,

    /// Print heatmap series as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SURFACE_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

impl Args {
    fn parameters(&self) -> Result<ParameterModel> {
        let mut model = ParameterModel::new();
        if let Some(end) = &self.end_date {
            model
                .set_end_date_text(end)
                .with_context(|| format!("invalid end date: {}", end))?;
            // Keep the trailing window anchored on the chosen end date
            let defaults = ParameterModel::with_end_date(model.end_date());
            model.set_start_date(defaults.start_date());
        }
        if let Some(start) = &self.start_date {
            model
                .set_start_date_text(start)
                .with_context(|| format!("invalid start date: {}", start))?;
        }
        model.set_ticker(self.stock.clone());
        model.set_strike_price_text(&self.strike_price);
        model.set_time_to_maturity(self.time_to_maturity);
        model.set_risk_free_rate(self.risk_free_rate);
        model.set_min_spot_price_text(&self.min_spot_price);
        model.set_max_spot_price_text(&self.max_spot_price);
        Ok(model)
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let parameters = args.parameters()?;
    let policy = if args.strict {
        ValidationPolicy::Strict
    } else {
        ValidationPolicy::Advisory
    };

    tracing::info!(gateway = %args.gateway_url, stock = %parameters.ticker(), "Requesting surface");

    let client = PricingRequestClient::new(args.gateway_url.clone());
    let mut controller =
        RequestLifecycleController::with_parameters(client, parameters).with_policy(policy);

    controller.activate();
    controller.settle().await;

    let state = controller.state();
    if args.json {
        if let Some((calls, puts)) = state.series() {
            let body = serde_json::json!({ "callData": calls, "putData": puts });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    } else {
        println!("{}", render_state(state));
    }

    if state.phase() == Phase::Failed {
        anyhow::bail!(state.error().unwrap_or("fetch failed").to_string());
    }
    Ok(())
}
