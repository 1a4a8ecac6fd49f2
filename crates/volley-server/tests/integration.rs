use axum::Router;
use chrono::Utc;
use volley_common::Payload;
use volley_server::{app, ACK_BODY, DECODE_ERROR_BODY};

async fn spawn_app() -> String {
    let app: Router = app();
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap(); });
    format!("http://{}:{}/", addr.ip(), addr.port())
}

fn payload_with(contents: String) -> Payload {
    Payload { sent_time: Utc::now(), contents }
}

#[tokio::test]
async fn malformed_body_gets_a_400_and_the_fixed_message() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let r = client
        .post(&base)
        .header("content-type", "application/json")
        .body("{definitely not json")
        .send()
        .await
        .unwrap();

    assert_eq!(r.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(r.text().await.unwrap(), DECODE_ERROR_BODY);
}

#[tokio::test]
async fn empty_contents_is_acknowledged() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let body = serde_json::to_vec(&payload_with(String::new())).unwrap();
    let r = client
        .post(&base)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(r.status(), reqwest::StatusCode::OK);
    assert_eq!(
        r.headers()[reqwest::header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(r.text().await.unwrap(), ACK_BODY);
}

#[tokio::test]
async fn ten_mib_contents_is_acknowledged_with_the_same_body() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let body = serde_json::to_vec(&payload_with("a".repeat(10 * 1024 * 1024))).unwrap();
    let r = client
        .post(&base)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(r.status(), reqwest::StatusCode::OK);
    assert_eq!(r.text().await.unwrap(), ACK_BODY);
}

#[tokio::test]
async fn healthz_answers_on_the_diagnostics_router() {
    let app = volley_server::diagnostics();
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap(); });

    let r = reqwest::get(format!("http://{}:{}/healthz", addr.ip(), addr.port()))
        .await
        .unwrap();
    assert!(r.status().is_success());
    assert!(r.text().await.unwrap().starts_with("ok"));
}
