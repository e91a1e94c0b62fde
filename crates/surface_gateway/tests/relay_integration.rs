//! Gateway behaviour against a stub pricing engine over real sockets.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use surface_client::prelude::*;
use surface_core::heatmap::to_series;
use surface_core::{HeatmapPoint, HeatmapSeries};
use surface_gateway::config::ServerConfig;
use surface_gateway::error::GENERIC_ERROR_MESSAGE;
use surface_gateway::routes::relay::RELAY_PATH;
use surface_gateway::server::Server;
use tokio::net::TcpListener;

#[derive(Clone)]
struct Engine {
    status: StatusCode,
    body: String,
    received: Arc<Mutex<Vec<Value>>>,
}

async fn engine_handler(State(engine): State<Engine>, Json(body): Json<Value>) -> (StatusCode, String) {
    engine.received.lock().unwrap().push(body);
    (engine.status, engine.body.clone())
}

async fn spawn_engine(status: StatusCode, body: &str) -> (String, Arc<Mutex<Vec<Value>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let engine = Engine {
        status,
        body: body.to_string(),
        received: Arc::clone(&received),
    };
    let app = Router::new()
        .route("/api/black-scholes", post(engine_handler))
        .with_state(engine);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    (format!("http://{}/api/black-scholes", addr), received)
}

async fn spawn_gateway(engine_url: &str) -> SocketAddr {
    let config = ServerConfig {
        engine_url: Some(engine_url.to_string()),
        ..Default::default()
    };
    let (addr, _handle) = Server::spawn_local(config).await.unwrap();
    addr
}

fn relay_url(addr: SocketAddr) -> String {
    format!("http://{}{}", addr, RELAY_PATH)
}

fn engine_reply() -> String {
    json!({
        "callData": [{"id": "0.2", "100": 5.1, "150": 10.2, "200": 20.5}],
        "putData": [{"id": "0.2", "100": 45.0, "150": 8.7, "200": 1.2}],
        "currentPrice": 150.0,
        "impliedVolatility": 0.2,
        "strikePrice": 150.0,
        "timeToMaturity": 1.0,
        "riskFreeRate": 0.01
    })
    .to_string()
}

fn assert_cors(response: &reqwest::Response) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET,OPTIONS,PATCH,DELETE,POST,PUT"
    );
    assert!(headers.contains_key("access-control-allow-headers"));
}

#[tokio::test]
async fn test_success_is_relayed_unmodified() {
    let (engine_url, received) = spawn_engine(StatusCode::OK, &engine_reply()).await;
    let gateway = spawn_gateway(&engine_url).await;

    let response = reqwest::Client::new()
        .post(relay_url(gateway))
        .json(&json!({"stock": "AAPL", "timeToMaturity": 1, "extra": true}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_cors(&response);
    let relayed: Value = response.json().await.unwrap();
    let expected: Value = serde_json::from_str(&engine_reply()).unwrap();
    assert_eq!(relayed, expected);

    let forwarded = received.lock().unwrap().clone();
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0], json!({"stock": "AAPL", "timeToMaturity": 1}));
}

#[tokio::test]
async fn test_omitted_fields_are_not_invented() {
    let (engine_url, received) = spawn_engine(StatusCode::OK, &engine_reply()).await;
    let gateway = spawn_gateway(&engine_url).await;

    let response = reqwest::Client::new()
        .post(relay_url(gateway))
        .json(&json!({"stock": "AAPL", "startDate": "2024-01-01", "endDate": "2024-01-31"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let forwarded = received.lock().unwrap()[0].clone();
    let keys: Vec<&str> = forwarded
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["stock", "startDate", "endDate"]);
}

#[tokio::test]
async fn test_preflight_never_reaches_engine() {
    let (engine_url, received) = spawn_engine(StatusCode::OK, "{}").await;
    let gateway = spawn_gateway(&engine_url).await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, relay_url(gateway))
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_cors(&response);
    assert!(response.bytes().await.unwrap().is_empty());
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_preflight_ignores_invalid_body() {
    let (engine_url, received) = spawn_engine(StatusCode::OK, "{}").await;
    let gateway = spawn_gateway(&engine_url).await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, relay_url(gateway))
        .header("content-type", "application/json")
        .body("{\"stock\": <<garbage")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_cors(&response);
    assert!(response.bytes().await.unwrap().is_empty());
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_body_is_hidden() {
    let (engine_url, _) =
        spawn_engine(StatusCode::INTERNAL_SERVER_ERROR, "Traceback: KeyError 'AAPL'").await;
    let gateway = spawn_gateway(&engine_url).await;

    let response = reqwest::Client::new()
        .post(relay_url(gateway))
        .json(&json!({"stock": "AAPL"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);
    let body = response.text().await.unwrap();
    assert!(!body.contains("Traceback"));
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({ "error": GENERIC_ERROR_MESSAGE }));
}

#[tokio::test]
async fn test_upstream_invalid_json_is_generic_500() {
    let (engine_url, _) = spawn_engine(StatusCode::OK, "<html>oops</html>").await;
    let gateway = spawn_gateway(&engine_url).await;

    let response = reqwest::Client::new()
        .post(relay_url(gateway))
        .json(&json!({"stock": "AAPL"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_unreachable_engine_is_generic_500() {
    let gateway = spawn_gateway("http://127.0.0.1:1/api/black-scholes").await;

    let response = reqwest::Client::new()
        .post(relay_url(gateway))
        .json(&json!({"stock": "AAPL"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);
}

#[tokio::test]
async fn test_get_is_405_with_allow_post() {
    let gateway = spawn_gateway("http://127.0.0.1:1/api/black-scholes").await;

    let response = reqwest::get(relay_url(gateway)).await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()["allow"], "POST");
    assert_cors(&response);
    assert_eq!(response.text().await.unwrap(), "Method GET Not Allowed");
}

#[tokio::test]
async fn test_client_through_gateway_reference_scenario() {
    let (engine_url, received) = spawn_engine(StatusCode::OK, &engine_reply()).await;
    let gateway = spawn_gateway(&engine_url).await;

    let mut model = ParameterModel::new();
    model.set_ticker("AAPL");
    model.set_start_date_text("2024-01-01").unwrap();
    model.set_end_date_text("2024-01-31").unwrap();
    model.set_strike_price(Some(150.0));
    model.set_time_to_maturity(1.0);
    model.set_risk_free_rate(0.01);
    model.set_min_spot_price(Some(100.0));
    model.set_max_spot_price(Some(200.0));

    let client = PricingRequestClient::new(relay_url(gateway));
    let surface = client.fetch_surface(&model).await.unwrap();

    assert_eq!(
        received.lock().unwrap()[0],
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

    assert_eq!(surface.stock_price, 150.0);
    assert_eq!(
        to_series(&surface.call_data),
        vec![HeatmapSeries {
            id: "0.2".to_string(),
            points: vec![
                HeatmapPoint { x: "100".to_string(), y: 5.1 },
                HeatmapPoint { x: "150".to_string(), y: 10.2 },
                HeatmapPoint { x: "200".to_string(), y: 20.5 },
            ],
        }]
    );
}

#[tokio::test]
async fn test_gateway_failure_reaches_client_as_fetch_error() {
    let (engine_url, _) = spawn_engine(StatusCode::BAD_GATEWAY, "upstream down").await;
    let gateway = spawn_gateway(&engine_url).await;

    let client = PricingRequestClient::new(relay_url(gateway));
    let err = client.fetch_surface(&ParameterModel::new()).await.unwrap_err();

    assert_eq!(err, FetchError::Upstream { status: 500 });
    assert_eq!(err.user_message(), "Failed to fetch data");
}
