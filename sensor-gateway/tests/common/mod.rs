//! In-process stand-in for the AWOS, D-ATIS, and ViewMondo upstreams.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower::ServiceExt;

use sensor_gateway::config::{Credentials, GatewayConfig};
use sensor_gateway::web::{AppState, create_router};

pub const TOKEN: &str = "tok-123";

/// Request counters, per upstream endpoint.
#[derive(Debug, Default)]
pub struct Hits {
    pub token: AtomicUsize,
    pub stations: AtomicUsize,
    pub measurements: AtomicUsize,
    pub last_measure_query: Mutex<Option<HashMap<String, String>>>,
}

impl Hits {
    pub fn token(&self) -> usize {
        self.token.load(Ordering::SeqCst)
    }

    pub fn stations(&self) -> usize {
        self.stations.load(Ordering::SeqCst)
    }

    pub fn measurements(&self) -> usize {
        self.measurements.load(Ordering::SeqCst)
    }
}

/// Behaviour of the stub upstream.
#[derive(Clone)]
pub struct Stub {
    pub token_ok: bool,
    /// Raw 200 body for the token endpoint, replacing the normal grant.
    pub token_body: Option<String>,
    pub stations_ok: bool,
    pub stations_delay: Duration,
    pub stations: Value,
    pub measurements_ok: bool,
    pub weather: Value,
    pub weather_delay: Duration,
    pub datis: String,
    pub latest: Value,
    pub history: Value,
    pub hits: Arc<Hits>,
}

impl Default for Stub {
    fn default() -> Self {
        Self {
            token_ok: true,
            token_body: None,
            stations_ok: true,
            stations_delay: Duration::ZERO,
            measurements_ok: true,
            stations: json!([
                {"Id": 1, "Name": "RWY 01", "LastData": {"WindSpeed": 7}},
                {"Id": 2, "Name": "RWY 28", "Latitude": 63.98, "LastData": {"WindSpeed": 14}},
                {"Id": 3, "Name": "RWY 19", "LastData": {"WindSpeed": 9}}
            ]),
            weather: json!({"temp": 5}),
            weather_delay: Duration::ZERO,
            datis: "BIKF ARR ATIS K 1200Z RWY 28 IN USE".to_string(),
            latest: json!({"Time": "2026-10-19T12:00:00Z", "WindSpeed": 14}),
            history: json!([
                {"Time": "2026-10-19T10:10:00Z", "WindSpeed": 12},
                {"Time": "2026-10-19T11:10:00Z", "WindSpeed": 13}
            ]),
            hits: Arc::new(Hits::default()),
        }
    }
}

fn authorised(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn token(State(stub): State<Stub>, Form(form): Form<HashMap<String, String>>) -> Response {
    stub.hits.token.fetch_add(1, Ordering::SeqCst);
    let well_formed = form.get("grant_type").map(String::as_str) == Some("password")
        && form.get("username").map(String::as_str) == Some("ops")
        && form.get("password").map(String::as_str) == Some("pw");

    if !stub.token_ok || !well_formed {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant"})),
        )
            .into_response();
    }
    if let Some(body) = stub.token_body {
        return ([(header::CONTENT_TYPE, "application/json")], body).into_response();
    }
    Json(json!({"access_token": TOKEN, "token_type": "bearer", "expires_in": 86399}))
        .into_response()
}

async fn stations(State(stub): State<Stub>, headers: HeaderMap) -> Response {
    stub.hits.stations.fetch_add(1, Ordering::SeqCst);
    if !authorised(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    tokio::time::sleep(stub.stations_delay).await;
    if !stub.stations_ok {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }
    Json(stub.stations.clone()).into_response()
}

async fn bare_stations(State(stub): State<Stub>, headers: HeaderMap) -> Response {
    stub.hits.stations.fetch_add(1, Ordering::SeqCst);
    if !authorised(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let bare: Vec<Value> = stub
        .stations
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|mut s| {
            if let Some(obj) = s.as_object_mut() {
                obj.remove("LastData");
                obj.remove("lastData");
            }
            s
        })
        .collect();
    Json(bare).into_response()
}

async fn latest(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    stub.hits.measurements.fetch_add(1, Ordering::SeqCst);
    if !authorised(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    *stub.hits.last_measure_query.lock().unwrap() = Some(query);
    if !stub.measurements_ok {
        return (StatusCode::INTERNAL_SERVER_ERROR, "sensor store offline").into_response();
    }
    Json(stub.latest.clone()).into_response()
}

async fn history(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    stub.hits.measurements.fetch_add(1, Ordering::SeqCst);
    if !authorised(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    *stub.hits.last_measure_query.lock().unwrap() = Some(query);
    if !stub.measurements_ok {
        return (StatusCode::INTERNAL_SERVER_ERROR, "sensor store offline").into_response();
    }
    Json(stub.history.clone()).into_response()
}

async fn weather(State(stub): State<Stub>) -> Json<Value> {
    tokio::time::sleep(stub.weather_delay).await;
    Json(stub.weather.clone())
}

async fn datis(State(stub): State<Stub>) -> String {
    stub.datis.clone()
}

/// Serve the stub on an ephemeral port; returns its root URL.
pub async fn spawn_upstream(stub: Stub) -> String {
    let app = Router::new()
        .route("/Token", post(token))
        .route("/api/v1/GetStations", get(bare_stations))
        .route("/api/v1/GetStationsWithLastData", get(stations))
        .route("/api/v1/GetStationLastData", get(latest))
        .route("/api/v1/GetStationData", get(history))
        .route("/awos/api/Values/", get(weather))
        .route("/datis", get(datis))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A root URL on which nothing is listening.
pub async fn dead_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Config pointing every upstream at `root`.
pub fn config(root: &str, timeout: Duration) -> GatewayConfig {
    GatewayConfig::new(Credentials::new("ops", "pw").unwrap())
        .with_upstream_root(root)
        .with_timeout(timeout)
}

/// Gateway router wired to `root`.
pub fn gateway(root: &str, timeout: Duration) -> Router {
    gateway_with(&config(root, timeout))
}

pub fn gateway_with(config: &GatewayConfig) -> Router {
    create_router(AppState::from_config(config).unwrap())
}

/// Issue a GET and collect status, content type, and body.
pub async fn get_body(app: Router, uri: &str) -> (StatusCode, String, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

/// Issue a GET and decode the body as JSON.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get_body(app, uri).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}
