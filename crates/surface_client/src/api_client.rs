//! API client for the pricing-surface gateway.

use async_trait::async_trait;
use surface_core::heatmap::check_rectangular;
use surface_core::{ParameterModel, PricingSurfaceRequest, PricingSurfaceResponse};
use tracing::{debug, warn};

use crate::error::FetchError;

/// Source of pricing surfaces.
///
/// Implementations perform exactly one attempt per call and resolve to a
/// single outcome.
#[async_trait]
pub trait SurfaceFetcher: Send + Sync + 'static {
    async fn fetch(
        &self,
        request: PricingSurfaceRequest,
    ) -> Result<PricingSurfaceResponse, FetchError>;
}

/// HTTP client posting surface requests to the gateway
#[derive(Debug, Clone)]
pub struct PricingRequestClient {
    endpoint: String,
    client: reqwest::Client,
}

impl PricingRequestClient {
    /// Create a new client for the given endpoint URL
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    /// Create a client reusing an existing connection pool
    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Snapshot `model` and fetch its surface
    pub async fn fetch_surface(
        &self,
        model: &ParameterModel,
    ) -> Result<PricingSurfaceResponse, FetchError> {
        self.send(&model.to_request()).await
    }

    /// POST one request; no retries
    pub async fn send(
        &self,
        request: &PricingSurfaceRequest,
    ) -> Result<PricingSurfaceResponse, FetchError> {
        debug!(endpoint = %self.endpoint, stock = %request.stock, "Fetching pricing surface");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "Gateway unreachable");
                FetchError::transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Gateway returned failure status");
            return Err(FetchError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(e.to_string()))?;

        let surface: PricingSurfaceResponse =
            serde_json::from_slice(&body).map_err(|e| FetchError::parse(e.to_string()))?;

        check_rectangular(&surface.call_data)
            .and_then(|_| check_rectangular(&surface.put_data))
            .map_err(|e| FetchError::parse(e.to_string()))?;

        debug!(
            call_rows = surface.call_data.len(),
            put_rows = surface.put_data.len(),
            "Received pricing surface"
        );
        Ok(surface)
    }
}

#[async_trait]
impl SurfaceFetcher for PricingRequestClient {
    async fn fetch(
        &self,
        request: PricingSurfaceRequest,
    ) -> Result<PricingSurfaceResponse, FetchError> {
        self.send(&request).await
    }
}
