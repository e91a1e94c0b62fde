//! PricingRequestClient against a local stub endpoint.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use surface_client::prelude::*;
use surface_core::heatmap::to_series;
use surface_core::ParameterModel;
use tokio::net::TcpListener;

/// Canned reply and the last body the stub received
#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    received: Arc<Mutex<Option<Value>>>,
}

async fn stub_handler(State(stub): State<Stub>, Json(body): Json<Value>) -> (StatusCode, String) {
    *stub.received.lock().unwrap() = Some(body);
    (stub.status, stub.body.clone())
}

async fn spawn_stub(status: StatusCode, body: &str) -> (SocketAddr, Arc<Mutex<Option<Value>>>) {
    let received = Arc::new(Mutex::new(None));
    let stub = Stub {
        status,
        body: body.to_string(),
        received: Arc::clone(&received),
    };
    let app = Router::new()
        .route("/api/black-scholes", post(stub_handler))
        .with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    (addr, received)
}

fn reference_parameters() -> ParameterModel {
    let mut model = ParameterModel::new();
    model.set_ticker("AAPL");
    model.set_start_date_text("2024-01-01").unwrap();
    model.set_end_date_text("2024-01-31").unwrap();
    model.set_strike_price(Some(150.0));
    model.set_time_to_maturity(1.0);
    model.set_risk_free_rate(0.01);
    model.set_min_spot_price(Some(100.0));
    model.set_max_spot_price(Some(200.0));
    model
}

fn reference_reply() -> String {
    json!({
        "callData": [{"id": "0.2", "100": 5.1, "150": 10.2, "200": 20.5}],
        "putData": [{"id": "0.2", "100": 45.0, "150": 8.7, "200": 1.2}],
        "stockPrice": 150.0,
        "impliedVolatility": 0.2,
        "strikePrice": 150.0,
        "timeToMaturity": 1.0,
        "riskFreeRate": 0.01
    })
    .to_string()
}

#[tokio::test]
async fn test_reference_scenario_end_to_end() {
    let (addr, received) = spawn_stub(StatusCode::OK, &reference_reply()).await;
    let client = PricingRequestClient::new(format!("http://{}/api/black-scholes", addr));

    let surface = client.fetch_surface(&reference_parameters()).await.unwrap();

    let sent = received.lock().unwrap().clone().unwrap();
    assert_eq!(
        sent,
        json!({
            "stock": "AAPL",
            "startDate": "2024-01-01",
            "endDate": "2024-01-31",
            "strikePrice": 150.0,
            "timeToMaturity": 1.0,
            "riskFreeRate": 0.01,
            "minSpotPrice": 100.0,
            "maxSpotPrice": 200.0
        })
    );

    let calls = to_series(&surface.call_data);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].id, "0.2");
    let xs: Vec<&str> = calls[0].points.iter().map(|p| p.x.as_str()).collect();
    assert_eq!(xs, vec!["100", "150", "200"]);
    assert_relative_eq!(calls[0].points[0].y, 5.1);
    assert_relative_eq!(calls[0].points[1].y, 10.2);
    assert_relative_eq!(calls[0].points[2].y, 20.5);
}

#[tokio::test]
async fn test_absent_optionals_are_sent_as_null() {
    let (addr, received) = spawn_stub(StatusCode::OK, &reference_reply()).await;
    let client = PricingRequestClient::new(format!("http://{}/api/black-scholes", addr));

    let mut model = reference_parameters();
    model.set_strike_price_text("");
    model.set_min_spot_price(None);
    model.set_max_spot_price(None);
    client.fetch_surface(&model).await.unwrap();

    let sent = received.lock().unwrap().clone().unwrap();
    assert_eq!(sent["strikePrice"], Value::Null);
    assert_eq!(sent["minSpotPrice"], Value::Null);
    assert_eq!(sent["maxSpotPrice"], Value::Null);
    assert!(sent.as_object().unwrap().contains_key("maxSpotPrice"));
}

#[tokio::test]
async fn test_failure_status_maps_to_upstream_error() {
    let (addr, _) = spawn_stub(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":"An error occurred while processing the request."}"#,
    )
    .await;
    let client = PricingRequestClient::new(format!("http://{}/api/black-scholes", addr));

    let err = client.fetch_surface(&reference_parameters()).await.unwrap_err();

    assert_eq!(err, FetchError::Upstream { status: 500 });
    assert_eq!(err.user_message(), "Failed to fetch data");
}

#[tokio::test]
async fn test_invalid_json_maps_to_parse_error() {
    let (addr, _) = spawn_stub(StatusCode::OK, "<html>oops</html>").await;
    let client = PricingRequestClient::new(format!("http://{}/api/black-scholes", addr));

    let err = client.fetch_surface(&reference_parameters()).await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn test_missing_fields_map_to_parse_error() {
    let (addr, _) = spawn_stub(StatusCode::OK, r#"{"callData": []}"#).await;
    let client = PricingRequestClient::new(format!("http://{}/api/black-scholes", addr));

    let err = client.fetch_surface(&reference_parameters()).await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn test_ragged_surface_maps_to_parse_error() {
    let body = json!({
        "callData": [
            {"id": "0.2", "100": 5.1, "150": 10.2},
            {"id": "0.3", "100": 6.0}
        ],
        "putData": [],
        "stockPrice": 150.0,
        "impliedVolatility": 0.2,
        "strikePrice": 150.0,
        "timeToMaturity": 1.0,
        "riskFreeRate": 0.01
    })
    .to_string();
    let (addr, _) = spawn_stub(StatusCode::OK, &body).await;
    let client = PricingRequestClient::new(format!("http://{}/api/black-scholes", addr));

    let err = client.fetch_surface(&reference_parameters()).await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(msg) if msg.contains("0.3")));
}

#[tokio::test]
async fn test_controller_drives_real_client() {
    let (addr, _) = spawn_stub(StatusCode::OK, &reference_reply()).await;
    let client = PricingRequestClient::new(format!("http://{}/api/black-scholes", addr));
    let mut controller = RequestLifecycleController::with_parameters(client, reference_parameters());

    controller.activate();
    controller.settle().await;

    let state = controller.state();
    assert_eq!(state.phase(), Phase::Success);
    let (calls, puts) = state.series().unwrap();
    assert_eq!(calls[0].points.len(), 3);
    assert_relative_eq!(puts[0].points[2].y, 1.2);
}
