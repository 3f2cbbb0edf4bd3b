//! End-to-end read-through behavior over real sockets.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{json, Value};

use cache_gateway::cache::MemoryStore;
use cache_gateway_sdk::GatewayClient;

mod common;

fn seeded() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert("user:42", "alice");
    store
}

#[tokio::test]
async fn test_hit_returns_value() {
    let gateway = common::start_gateway(seeded().into(), Duration::from_secs(5)).await;

    let res = common::client()
        .get(gateway.url("/api/v1/cached-data/user:42"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), StatusCode::OK.as_u16());
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"data": "alice"}));

    assert_eq!(gateway.shutdown().await, cache_gateway::DrainOutcome::Clean);
}

#[tokio::test]
async fn test_miss_returns_404() {
    let gateway = common::start_gateway(seeded().into(), Duration::from_secs(5)).await;

    let res = common::client()
        .get(gateway.url("/api/v1/cached-data/user:99"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"error": "Data not found"}));

    gateway.shutdown().await;
}

#[tokio::test]
async fn test_backend_failure_hides_cause() {
    let gateway = common::start_gateway(common::refused_redis(), Duration::from_secs(5)).await;

    let res = common::client()
        .get(gateway.url("/api/v1/cached-data/user:42"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 500);

    let text = res.text().await.unwrap();
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body, json!({"error": "Internal server error"}));
    assert!(!text.to_lowercase().contains("refused"));
    assert!(!text.contains("127.0.0.1"));

    gateway.shutdown().await;
}

#[tokio::test]
async fn test_health_ignores_backend() {
    let gateway = common::start_gateway(common::refused_redis(), Duration::from_secs(5)).await;

    let res = common::client()
        .get(gateway.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"status": "healthy"}));

    gateway.shutdown().await;
}

#[tokio::test]
async fn test_empty_key_rejected() {
    let gateway = common::start_gateway(seeded().into(), Duration::from_secs(5)).await;

    let res = common::client()
        .get(gateway.url("/api/v1/cached-data/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"error": "key must not be empty"}));

    gateway.shutdown().await;
}

#[tokio::test]
async fn test_process_data() {
    let gateway = common::start_gateway(seeded().into(), Duration::from_secs(5)).await;
    let client = common::client();

    let res = client
        .post(gateway.url("/api/v1/process-data"))
        .json(&json!({"input": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"processed": true, "input": "hello"}));

    let res = client
        .post(gateway.url("/api/v1/process-data"))
        .header("content-type", "application/json")
        .body("{broken")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);

    gateway.shutdown().await;
}

#[tokio::test]
async fn test_unknown_route() {
    let gateway = common::start_gateway(seeded().into(), Duration::from_secs(5)).await;

    let res = common::client()
        .get(gateway.url("/api/v2/anything"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"error": "Not found"}));

    gateway.shutdown().await;
}

#[tokio::test]
async fn test_sdk_round_trip() {
    let store = seeded();
    store.insert("path/with space", "escaped");
    let gateway = common::start_gateway(store.into(), Duration::from_secs(5)).await;
    let sdk = GatewayClient::new(&format!("http://{}", gateway.addr)).unwrap();

    assert_eq!(sdk.health().await.unwrap().status, "healthy");
    assert_eq!(sdk.get_cached_data("user:42").await.unwrap().data, "alice");
    assert_eq!(
        sdk.get_cached_data("path/with space").await.unwrap().data,
        "escaped"
    );

    let missing = sdk.get_cached_data("user:0").await.unwrap_err();
    assert!(missing.is_not_found());
    assert!(missing.to_string().contains("Data not found"));

    let processed = sdk.process_data("abc").await.unwrap();
    assert!(processed.processed);
    assert_eq!(processed.input, "abc");

    gateway.shutdown().await;
}
