//! Pricing relay endpoint
//!
//! `POST /api/black-scholes` forwards the eight request fields to the
//! pricing engine and relays its JSON answer. `OPTIONS` answers pre-flight
//! checks with an empty success. Any other method gets 405.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use super::AppState;
use crate::error::GatewayError;

/// Path the relay is mounted on
pub const RELAY_PATH: &str = "/api/black-scholes";

/// Request fields the pricing engine understands, in wire order
pub const CONTRACT_FIELDS: [&str; 8] = [
    "stock",
    "startDate",
    "endDate",
    "strikePrice",
    "timeToMaturity",
    "riskFreeRate",
    "minSpotPrice",
    "maxSpotPrice",
];

/// The request fields forwarded upstream.
///
/// Values stay untyped so the engine remains the only judge of their
/// validity. A field the caller sent, `null` included, is forwarded as is;
/// a field the caller left out stays out so the engine can apply its own
/// default. Keys outside the contract are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RelayPayload(Map<String, Value>);

impl RelayPayload {
    /// Read the caller's body, which must be a JSON object
    pub fn from_body(body: &[u8]) -> Result<Self, GatewayError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| GatewayError::BadRequest(e.to_string()))?;
        let Value::Object(mut fields) = value else {
            return Err(GatewayError::BadRequest(
                "expected a JSON object".to_string(),
            ));
        };

        let forwarded = CONTRACT_FIELDS
            .iter()
            .filter_map(|key| fields.remove(*key).map(|v| (key.to_string(), v)))
            .collect();
        Ok(Self(forwarded))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of contract fields the caller supplied
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build the relay routes
pub fn routes() -> Router<AppState> {
    Router::new().route(
        RELAY_PATH,
        post(relay_handler)
            .options(preflight_handler)
            .fallback(method_not_allowed),
    )
}

/// OPTIONS - pre-flight
async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

/// POST - forward to the pricing engine
async fn relay_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("relay", %request_id);
    forward(&state, &body).instrument(span).await.map(Json)
}

async fn forward(state: &AppState, body: &[u8]) -> Result<Value, GatewayError> {
    let payload = RelayPayload::from_body(body)?;
    debug!(engine = %state.engine_url, payload = ?payload, "Forwarding request");

    let response = state
        .http
        .post(&*state.engine_url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| {
            error!(engine = %state.engine_url, error = %e, "Pricing engine unreachable");
            GatewayError::Transport(e.to_string())
        })?;

    let status = response.status();
    info!(status = status.as_u16(), "Pricing engine responded");

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), body = %body, "Pricing engine request failed");
        return Err(GatewayError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    response.json::<Value>().await.map_err(|e| {
        error!(error = %e, "Pricing engine returned invalid JSON");
        GatewayError::Parse(e.to_string())
    })
}

/// Any other method
async fn method_not_allowed(method: Method) -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        format!("Method {} Not Allowed", method),
    )
}
