//! Integration tests for the POST /talk upstream proxy against a mock
//! small-talk API.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use myjlab_server::state::AppState;

/// Mock upstream: records the raw request body and replies with a canned
/// JSON payload. A second route replies with a body that is not JSON.
#[derive(Clone)]
struct MockUpstream {
    response: Value,
    captured_body: Arc<Mutex<Option<String>>>,
}

async fn mock_smalltalk(State(mock): State<MockUpstream>, body: String) -> Json<Value> {
    *mock.captured_body.lock().unwrap() = Some(body);
    Json(mock.response.clone())
}

async fn mock_plain_text() -> &'static str {
    "definitely not json"
}

async fn start_mock_upstream(response: Value) -> (SocketAddr, Arc<Mutex<Option<String>>>) {
    let captured_body = Arc::new(Mutex::new(None));
    let mock = MockUpstream {
        response,
        captured_body: captured_body.clone(),
    };
    let app = Router::new()
        .route("/smalltalk", post(mock_smalltalk))
        .route("/plain", post(mock_plain_text))
        .with_state(mock);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, captured_body)
}

/// Start the server on a random port, pointed at the given upstream URL.
async fn start_test_server(talk_api_url: String, talk_api_key: &str) -> SocketAddr {
    let state = AppState::new(talk_api_url, talk_api_key.to_string());
    let app = myjlab_server::routes::build_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    addr
}

#[tokio::test]
async fn test_talk_returns_upstream_body_verbatim() {
    let upstream_body = json!({
        "status": 0,
        "message": "OK",
        "results": [{ "perplexity": 0.07, "reply": "こんにちは" }]
    });
    let (upstream_addr, captured_body) = start_mock_upstream(upstream_body.clone()).await;
    let addr = start_test_server(
        format!("http://{}/smalltalk", upstream_addr),
        "secret-api-key",
    )
    .await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{}/talk", addr))
        .json(&json!({ "query": "hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, upstream_body);

    // The upstream received a multipart form carrying the query and the
    // configured credential.
    let raw = captured_body.lock().unwrap().take().expect("No upstream request captured");
    assert!(raw.contains("name=\"query\""), "missing query part: {raw}");
    assert!(raw.contains("hello"));
    assert!(raw.contains("name=\"apikey\""), "missing apikey part: {raw}");
    assert!(raw.contains("secret-api-key"));
}

#[tokio::test]
async fn test_talk_surfaces_unreachable_upstream_as_bad_gateway() {
    // Nothing listens on the upstream address.
    let addr = start_test_server("http://127.0.0.1:9/smalltalk".to_string(), "key").await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{}/talk", addr))
        .json(&json!({ "query": "hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("upstream unavailable"), "error: {error}");
}

#[tokio::test]
async fn test_talk_surfaces_non_json_upstream_body_as_bad_gateway() {
    let (upstream_addr, _captured) = start_mock_upstream(json!({})).await;
    let addr = start_test_server(format!("http://{}/plain", upstream_addr), "key").await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{}/talk", addr))
        .json(&json!({ "query": "hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("malformed response"), "error: {error}");
}
