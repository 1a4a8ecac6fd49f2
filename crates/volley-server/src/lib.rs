//! Ingest server for the volley harness: decode the payload, log timing,
//! return a fixed acknowledgment.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use once_cell::sync::Lazy;
use volley_common::Payload;

/// Body returned for every successfully decoded payload, byte for byte.
pub const ACK_BODY: &str = r#"{"message": "Hello, World!"}"#;

/// Plain-text body returned when the request payload fails to decode.
pub const DECODE_ERROR_BODY: &str = "Invalid request payload";

static STARTED: Lazy<Instant> = Lazy::new(Instant::now);

/// Ingest router: one POST route with the default request size cap removed,
/// since payloads are expected to run to tens of MiB.
pub fn app() -> Router {
    Router::new()
        .route("/", post(ingest))
        .layer(DefaultBodyLimit::disable())
}

/// Diagnostics router, served on a separate local port by `volley serve`.
pub fn diagnostics() -> Router {
    // Touch the static so uptime counts from process start, not first probe.
    let _ = *STARTED;
    Router::new().route("/healthz", get(healthz))
}

async fn healthz() -> String {
    format!("ok uptime={:?}", STARTED.elapsed())
}

async fn ingest(body: Bytes) -> Response {
    let started = Instant::now();
    tracing::info!(target: "server", at = %Utc::now(), "request started");

    let payload: Payload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(target: "server", "error decoding request body: {e}");
            return (StatusCode::BAD_REQUEST, DECODE_ERROR_BODY).into_response();
        }
    };

    tracing::info!(
        target: "server",
        sent = %payload.sent_time,
        received = %Utc::now(),
        decode = ?started.elapsed(),
        contents_bytes = payload.contents.len(),
        "payload decoded"
    );

    let response = ([(header::CONTENT_TYPE, "application/json")], ACK_BODY).into_response();
    tracing::info!(target: "server", elapsed = ?started.elapsed(), "request completed");
    response
}
