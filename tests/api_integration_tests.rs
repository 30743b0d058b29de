//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle through the router, with an
//! in-memory range store standing in for the upstream.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sheet_cache::api::create_router;
use sheet_cache::config::TtlPolicy;
use sheet_cache::upstream::InMemoryRangeStore;
use sheet_cache::{AppState, DataAccess};
use tower::ServiceExt;

// == Helper Functions ==

fn seeded_store() -> Arc<InMemoryRangeStore> {
    Arc::new(InMemoryRangeStore::with_ranges([
        ("Clusters!A:C", vec![vec![json!("north"), json!(12)]]),
        ("Kpi!A:B", vec![vec![json!("revenue"), json!(100)]]),
    ]))
}

fn create_test_app(store: Arc<InMemoryRangeStore>) -> Router {
    let access = DataAccess::new(store, TtlPolicy::default());
    create_router(AppState::new(access))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// == Read Endpoint Tests ==

#[tokio::test]
async fn test_read_endpoint_returns_rows() {
    let app = create_test_app(seeded_store());

    let response = app
        .oneshot(get("/ranges/Clusters!A:C?key=pex:clusters"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["range"], "Clusters!A:C");
    assert_eq!(json["key"], "pex:clusters");
    assert_eq!(json["rows"], json!([["north", 12]]));
}

#[tokio::test]
async fn test_read_endpoint_default_key() {
    let app = create_test_app(seeded_store());

    let response = app.oneshot(get("/ranges/Kpi!A:B")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "range:Kpi!A:B");
}

#[tokio::test]
async fn test_repeated_reads_hit_cache() {
    let store = seeded_store();
    let app = create_test_app(Arc::clone(&store));

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(get("/ranges/Kpi!A:B?key=kpi:values&category=aggregates"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(store.fetch_count(), 1);

    let response = app.oneshot(get("/stats")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 2);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["size"], 1);
    assert_eq!(json["hitRate"], "66.67%");
}

#[tokio::test]
async fn test_read_endpoint_rejects_unknown_category() {
    let app = create_test_app(seeded_store());

    let response = app
        .oneshot(get("/ranges/Kpi!A:B?category=weekly"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_read_endpoint_unknown_range() {
    let app = create_test_app(seeded_store());

    let response = app.oneshot(get("/ranges/Nope!A:A")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("Nope!A:A"));
}

// == Write Endpoint Tests ==

#[tokio::test]
async fn test_write_then_read_returns_new_rows() {
    let store = seeded_store();
    let app = create_test_app(Arc::clone(&store));

    let response = app
        .clone()
        .oneshot(get("/ranges/Kpi!A:B?key=kpi:values"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(put_json(
            "/ranges/Kpi!A:B",
            json!({"rows": [["revenue", 250]], "invalidate": "kpi:values"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["invalidated"], "kpi:values");

    let response = app
        .oneshot(get("/ranges/Kpi!A:B?key=kpi:values"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["rows"], json!([["revenue", 250]]));
    assert_eq!(store.fetch_count(), 2);
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_write_endpoint_invalid_json() {
    let app = create_test_app(seeded_store());

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/ranges/Kpi!A:B")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"rows": "not rows"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == Invalidation Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_key_endpoint() {
    let app = create_test_app(seeded_store());

    app.clone()
        .oneshot(get("/ranges/Kpi!A:B?key=kpi:values"))
        .await
        .unwrap();

    let response = app.clone().oneshot(delete("/cache/kpi:values")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, json!({"key": "kpi:values", "removed": true}));

    let response = app.oneshot(delete("/cache/kpi:values")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], false);
}

#[tokio::test]
async fn test_invalidate_prefix_endpoint() {
    let store = seeded_store();
    let app = create_test_app(Arc::clone(&store));

    for uri in [
        "/ranges/Kpi!A:B?key=a:1",
        "/ranges/Kpi!A:B?key=a:2",
        "/ranges/Clusters!A:C?key=b:1",
    ] {
        app.clone().oneshot(get(uri)).await.unwrap();
    }

    let response = app.clone().oneshot(delete("/cache?prefix=a:")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, json!({"prefix": "a:", "removed": 2}));

    app.oneshot(get("/ranges/Clusters!A:C?key=b:1")).await.unwrap();
    assert_eq!(store.fetch_count(), 3, "b:1 still served from cache");
}

#[tokio::test]
async fn test_invalidate_prefix_without_separator_is_rejected() {
    let app = create_test_app(seeded_store());

    let response = app.oneshot(delete("/cache?prefix=pex")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalidate_prefix_missing_parameter() {
    let app = create_test_app(seeded_store());

    let response = app.oneshot(delete("/cache")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unqualified_cache_key_is_rejected() {
    let store = seeded_store();
    let app = create_test_app(Arc::clone(&store));

    let response = app
        .clone()
        .oneshot(get("/ranges/Kpi!A:B?key=nocolon"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.fetch_count(), 0);

    let response = app.oneshot(delete("/cache/nocolon")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clear_endpoint_empties_cache() {
    let app = create_test_app(seeded_store());

    app.clone().oneshot(get("/ranges/Kpi!A:B")).await.unwrap();

    let response = app
        .clone()
        .oneshot(delete("/cache?all=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/stats")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["size"], 0);
}

// == Concurrency Tests ==

#[tokio::test]
async fn test_concurrent_requests_share_one_upstream_fetch() {
    let store = Arc::new(
        InMemoryRangeStore::with_ranges([("Slow!A:A", vec![vec![json!("x")]])])
            .with_latency(Duration::from_millis(100)),
    );
    let app = create_test_app(Arc::clone(&store));

    let requests = (0..5).map(|_| {
        let app = app.clone();
        tokio::spawn(async move { app.oneshot(get("/ranges/Slow!A:A?key=slow:m")).await.unwrap() })
    });

    for handle in requests.collect::<Vec<_>>() {
        let response = handle.await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["rows"], json!([["x"]]));
    }

    assert_eq!(store.fetch_count(), 1);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(seeded_store());

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_app(seeded_store());

    let response = app.oneshot(get("/nonexistent")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
