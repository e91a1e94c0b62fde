//! Server startup and binding
//!
//! Provides functionality to start the Axum server with configurable host/port.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::routes;

/// Server instance that can be started
pub struct Server {
    /// Gateway configuration
    config: ServerConfig,
    /// The built router
    router: Router,
}

impl Server {
    /// Create a new server instance with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let router = routes::build_router(&config);

        Self { config, router }
    }

    /// Address the server will bind to; host names are resolved at bind time
    pub fn bind_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind to the configured host/port and serve requests
    pub async fn run(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.bind_addr()).await?;
        self.run_with_listener(listener).await
    }

    /// Run the server with a specific listener
    ///
    /// Tests bind a listener to port 0 to get a random available port.
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            engine = %self.config.engine_url(),
            "Gateway listening"
        );

        axum::serve(listener, self.router).await
    }

    /// Bind to an ephemeral loopback port and serve in a background task
    pub async fn spawn_local(
        config: ServerConfig,
    ) -> Result<(SocketAddr, tokio::task::JoinHandle<()>), std::io::Error> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server = Self::new(config);
        let handle = tokio::spawn(async move {
            if let Err(e) = server.run_with_listener(listener).await {
                tracing::error!(error = %e, "Gateway stopped");
            }
        });

        Ok((addr, handle))
    }
}
