//! End-to-end tests of the HTTP surface
//!
//! The primary role is served by the in-memory product fake; the secondary
//! role by a real SQLite store over an in-memory database.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

use duostore_core::Facade;
use duostore_core::testing::MemoryProductStore;
use duostore_observability::Metrics;
use duostore_server::{build_router, store_factory::build_registry};
use duostore_store_sqlite::SqliteUserStore;

async fn user_store() -> SqliteUserStore {
    // One connection so every query sees the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, user_name TEXT NOT NULL, age INTEGER NOT NULL)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO users (id, user_name, age) VALUES (1, 'alice', 31), (2, 'bob', 45)")
        .execute(&pool)
        .await
        .unwrap();
    SqliteUserStore::from_pool(pool)
}

fn router(primary: MemoryProductStore, secondary: Option<SqliteUserStore>) -> Router {
    let metrics = Arc::new(Metrics::new().unwrap());
    let registry = build_registry(Some(primary), secondary, &metrics).unwrap();
    build_router(Arc::new(Facade::new(Arc::new(registry))), metrics)
}

async fn app() -> Router {
    router(MemoryProductStore::default(), Some(user_store().await))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_list_secondary_users() {
    let app = app().await;
    let (status, body) = get_json(&app, "/test").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"id": 1, "userName": "alice", "age": 31},
            {"id": 2, "userName": "bob", "age": 45}
        ])
    );
}

#[tokio::test]
async fn test_find_secondary_user() {
    let app = app().await;

    let (status, body) = get_json(&app, "/test/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userName"], "bob");

    let (status, body) = get_json(&app, "/test/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);

    let (status, body) = get_json(&app, "/test/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let app = app().await;
    let (status, body) = get_json(&app, "/products/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_widget_scenario() {
    let app = app().await;

    let draft = json!({"productName": "Widget", "category": "Tools", "price": 9.99, "stock": 5});
    let (status, body) = post_json(&app, "/test1", &draft).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (status, products) = get_json(&app, "/products").await;
    assert_eq!(status, StatusCode::OK);
    let products = products.as_array().unwrap();
    assert_eq!(products.len(), 1);

    let created = &products[0];
    assert_eq!(created["productName"], "Widget");
    assert_eq!(created["category"], "Tools");
    assert_eq!(created["price"], 9.99);
    assert_eq!(created["stock"], 5);
    assert!(created["createTime"].is_string());

    let id = created["id"].as_i64().unwrap();
    let (status, found) = get_json(&app, &format!("/products/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&found, created);
}

#[tokio::test]
async fn test_blank_name_is_rejected_without_write() {
    let app = app().await;

    let draft = json!({"productName": "  ", "category": "Tools", "price": 1, "stock": 1});
    let (status, body) = post_json(&app, "/test1", &draft).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], 400);

    let (_, products) = get_json(&app, "/products").await;
    assert_eq!(products, json!([]));
}

#[tokio::test]
async fn test_oversized_price_is_bad_request() {
    let app = app().await;

    let draft = json!({"productName": "X", "price": 100000000000u64});
    let (status, body) = post_json(&app, "/test1", &draft).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("out of range"));

    let (_, products) = get_json(&app, "/products").await;
    assert_eq!(products, json!([]));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/test1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_product_store_failure_is_internal_error() {
    let app = router(MemoryProductStore::failing("connection refused"), None);
    let (status, body) = get_json(&app, "/products").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], 500);
    assert!(body["error"].as_str().unwrap().contains("memory"));
}

#[tokio::test]
async fn test_without_secondary_users_are_empty() {
    let app = router(MemoryProductStore::default(), None);

    let (status, body) = get_json(&app, "/test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = get_json(&app, "/test/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(&app, "/products").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cross_store_probe() {
    let app = app().await;
    let request = Request::builder().uri("/testA").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_readiness_reports_both_roles() {
    let app = router(MemoryProductStore::default(), None);
    let (status, body) = get_json(&app, "/readyz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["stores"][0]["role"], "primary");
    assert_eq!(body["stores"][0]["available"], true);
    assert_eq!(body["stores"][1]["role"], "secondary");
    assert_eq!(body["stores"][1]["available"], false);
}

#[tokio::test]
async fn test_metrics_track_store_operations() {
    let app = app().await;
    get_json(&app, "/products").await;

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    let text = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("duostore_store_operations_total"));
    assert!(text.contains(r#"operation="find_all""#));
    assert!(text.contains("duostore_store_available"));
}

#[tokio::test]
async fn test_cors_mirrors_origin() {
    let app = app().await;
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/products")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let headers = response.headers();

    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://example.com"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
    assert_eq!(headers.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "3600");
}
