//! Surface Gateway
//!
//! CORS relay between browser clients and the option pricing engine.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use surface_gateway::config::{build_config, CliArgs as ConfigCliArgs};
use surface_gateway::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Surface Gateway - relay for the option pricing engine
#[derive(Parser, Debug)]
#[command(name = "surface_gateway")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host address to bind to
    #[arg(long, env = "SURFACE_GATEWAY_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SURFACE_GATEWAY_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SURFACE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Pricing engine endpoint
    #[arg(long, env = "SURFACE_ENGINE_URL")]
    engine_url: Option<String>,
}

impl From<Args> for ConfigCliArgs {
    fn from(args: Args) -> Self {
        ConfigCliArgs {
            config_file: args.config,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            engine_url: args.engine_url,
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let cli_args: ConfigCliArgs = args.into();
    let config = build_config(&cli_args)?;

    init_tracing(config.log_level.as_filter_str());

    tracing::info!("Surface Gateway v{}", surface_gateway::VERSION);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        log_level = %config.log_level,
        environment = %config.environment,
        engine_url = %config.engine_url(),
        "Gateway configuration loaded"
    );

    let server = Server::new(config);
    tracing::info!(address = %server.bind_addr(), "Starting gateway");

    server.run().await?;

    Ok(())
}
