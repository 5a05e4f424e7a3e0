//! Tests for the HTTP transport

use super::*;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn open_session(app: &Router) -> String {
    let (status, body) = call(app, Method::POST, "/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["session_id"].as_str().unwrap().to_string()
}

fn init_body() -> Value {
    json!({
        "app_name": "billing",
        "language": "python",
        "git_sha": "3630e05a",
        "turbine_version": "0.1.0"
    })
}

fn connector_body(name: &str, plugin: &str) -> Value {
    json!({"name": name, "plugin": {"name": plugin, "configs": {"collection": "accounts"}}})
}

#[tokio::test]
async fn test_health() {
    let app = router(ServerConfig::default());
    let (status, body) = call(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_versions_marks_latest() {
    let app = router(ServerConfig::default());
    let (_, body) = call(&app, Method::GET, "/versions", None).await;

    let versions = body["data"]["versions"].as_array().unwrap();
    assert_eq!(versions.len(), 3);
    assert_eq!(versions[2], json!({"version": "v3", "latest": true}));
}

#[tokio::test]
async fn test_session_round_trip() {
    let app = router(ServerConfig::default());
    let id = open_session(&app).await;
    let base = format!("/sessions/{id}");

    let (status, _) = call(&app, Method::POST, &format!("{base}/init"), Some(init_body())).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(
        &app,
        Method::POST,
        &format!("{base}/sources"),
        Some(connector_body("pg", "builtin:postgres")),
    )
    .await;
    let source = body["data"]["stream_name"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("{base}/records/read"),
        Some(json!({"source_stream": source})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["records"], json!([]));

    let (_, body) = call(
        &app,
        Method::POST,
        &format!("{base}/records/process"),
        Some(json!({
            "process": {"name": "enrich"},
            "stream_records": {"stream_name": source, "records": [{"id": 7}]}
        })),
    )
    .await;
    let function = body["data"]["stream_name"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["records"], json!([{"id": 7}]));

    let (_, body) = call(&app, Method::GET, &format!("{base}/functions"), None).await;
    assert_eq!(body["data"]["has_functions"], json!(true));

    let (_, body) = call(
        &app,
        Method::POST,
        &format!("{base}/destinations"),
        Some(connector_body("warehouse", "builtin:s3")),
    )
    .await;
    let destination = body["data"]["stream_name"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("{base}/records/write"),
        Some(json!({
            "destination_id": destination,
            "stream_records": {"stream_name": function, "records": []}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("{base}/spec"),
        Some(json!({"image": "registry/billing:2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let spec = &body["data"];
    assert_eq!(spec["definition"]["metadata"]["spec_version"], "v3");
    assert_eq!(spec["functions"][0]["image"], "registry/billing:2");
    assert_eq!(spec["streams"].as_array().unwrap().len(), 2);

    // Producing the specification closes the session
    let (status, _) = call(&app, Method::GET, &format!("{base}/functions"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The produced document passes the validation endpoint
    let (status, body) = call(&app, Method::POST, "/validate", Some(spec.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["roots"], json!([source]));
}

#[tokio::test]
async fn test_unknown_session() {
    let app = router(ServerConfig::default());
    let (status, body) = call(&app, Method::POST, "/sessions/ghost/init", Some(init_body())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], "session 'ghost' not found");
}

#[tokio::test]
async fn test_session_state_conflicts() {
    let app = router(ServerConfig::default());
    let id = open_session(&app).await;

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/sessions/{id}/sources"),
        Some(connector_body("pg", "builtin:postgres")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    call(&app, Method::POST, &format!("/sessions/{id}/init"), Some(init_body())).await;
    let (status, _) = call(&app, Method::POST, &format!("/sessions/{id}/init"), Some(init_body())).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rejections_map_to_status() {
    let app = router(ServerConfig::default());
    let id = open_session(&app).await;
    let base = format!("/sessions/{id}");

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("{base}/init"),
        Some(json!({"app_name": "", "language": "go", "turbine_version": "0.1.0"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    call(&app, Method::POST, &format!("{base}/init"), Some(init_body())).await;
    call(
        &app,
        Method::POST,
        &format!("{base}/destinations"),
        Some(connector_body("warehouse", "builtin:s3")),
    )
    .await;

    let (status, body) = call(&app, Method::POST, &format!("{base}/spec"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], json!(false));

    // A failed finish leaves the session open for corrections
    let (status, _) = call(&app, Method::GET, &format!("{base}/functions"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_session() {
    let app = router(ServerConfig::default());
    let id = open_session(&app).await;

    let (status, _) = call(&app, Method::DELETE, &format!("/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::DELETE, &format!("/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validate_rejects_schema_violation() {
    let app = router(ServerConfig::default());
    let (status, body) = call(
        &app,
        Method::POST,
        "/validate",
        Some(json!({"definition": {"metadata": {"spec_version": "v3"}}})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("validation"));
}
