//! HTTP facade tests

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fleet_tracker::app::options::LedgerOptions;
use fleet_tracker::app::state::AppState;
use fleet_tracker::server::serve::router;
use serde_json::{json, Value};
use tower::ServiceExt;

fn create_test_app() -> Router {
    let state = AppState::init(&LedgerOptions::default());
    router(Arc::new(state.server_state()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test(start_paused = true)]
async fn test_deploy_then_complete() {
    let app = create_test_app();

    let (status, body) = post(
        &app,
        "/api/deploy",
        json!({"version": "v2.0.0", "servers": ["alijack"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "deployment started");
    assert_eq!(body["data"]["status"], "running");
    assert_eq!(body["data"]["servers"], json!(["alijack"]));
    let id = body["data"]["id"].as_str().unwrap().to_string();

    tokio::time::sleep(Duration::from_secs(6)).await;

    let (status, body) = get(&app, "/api/deployments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    let first = &body["data"][0];
    assert_eq!(first["id"], id.as_str());
    assert_eq!(first["status"], "success");
    assert!(first["completedAt"].is_string());

    let (status, body) = get(&app, &format!("/api/deployments/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["duration"], "2m 15s");
}

#[tokio::test(start_paused = true)]
async fn test_deploy_defaults() {
    let app = create_test_app();

    let request = Request::post("/api/deploy").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], "v1.2.1");
    assert_eq!(body["data"]["servers"], json!(["alijack", "tenjack"]));
}

#[tokio::test(start_paused = true)]
async fn test_deploy_validation() {
    let app = create_test_app();

    for body in [
        json!({"version": "  "}),
        json!({"version": "v2.0.0", "servers": []}),
        json!({"version": "v2.0.0", "servers": ["nowhere"]}),
        json!({"version": 42}),
    ] {
        let (status, response) = post(&app, "/api/deploy", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["success"], false);
        assert!(response["error"].is_string());
    }

    let (_, body) = get(&app, "/api/deployments").await;
    assert_eq!(body["total"], 2);
}

#[tokio::test(start_paused = true)]
async fn test_rollback() {
    let app = create_test_app();

    let (status, body) = post(&app, "/api/rollback/999", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = post(&app, "/api/rollback/2", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "rollback started");
    assert_eq!(body["data"]["rollback"], true);
    assert_eq!(body["data"]["originalDeployment"], "2");
    assert_eq!(body["data"]["version"], "v1.2.0");
}

#[tokio::test(start_paused = true)]
async fn test_servers() {
    let app = create_test_app();

    let (status, body) = get(&app, "/api/servers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert!(body["timestamp"].is_string());

    let (status, body) = get(&app, "/api/servers/alijack").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "alijack");
    assert_eq!(body["data"]["host"], "182.92.31.155");

    let (status, body) = get(&app, "/api/servers/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test(start_paused = true)]
async fn test_monitoring() {
    let app = create_test_app();

    let (status, body) = get(&app, "/api/monitoring").await;
    assert_eq!(status, StatusCode::OK);
    let samples = body["data"].as_array().unwrap();
    assert_eq!(samples.len(), 24);
    for sample in samples {
        let cpu = sample["cpu"].as_u64().unwrap();
        assert!((40..70).contains(&cpu));
        assert!(sample["time"].is_string());
    }

    let (_, body) = get(&app, "/api/monitoring?count=3").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (status, _) = get(&app, "/api/monitoring?count=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = get(&app, "/api/monitoring?count=many").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_logs() {
    let app = create_test_app();

    let (status, body) = get(&app, "/api/logs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);

    let (_, body) = get(&app, "/api/logs?server=tenjack").await;
    assert_eq!(body["total"], 2);
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|entry| entry["server"] == "tenjack"));
}

#[tokio::test(start_paused = true)]
async fn test_commands() {
    let app = create_test_app();

    let (status, body) = post(&app, "/api/command", json!({"command": "status", "args": []})).await;
    assert_eq!(status, StatusCode::OK);
    let output = body["data"]["output"].as_str().unwrap();
    assert!(output.starts_with("Server status check complete"));
    assert!(output.contains("alijack: ✓ healthy"));
    assert!(output.contains("tenjack: ✓ healthy"));

    let (_, body) = post(&app, "/api/command", json!({"command": "deploy"})).await;
    assert!(body["data"]["output"]
        .as_str()
        .unwrap()
        .ends_with("Deployment complete!\n"));

    let (_, body) = post(&app, "/api/command", json!({"command": "restart"})).await;
    assert_eq!(body["data"]["output"], "command restart completed");

    let (status, _) = post(&app, "/api/command", json!({"command": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_health_and_unknown_routes() {
    let app = create_test_app();

    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert!(body["data"]["version"].is_string());

    let (status, body) = get(&app, "/api/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "endpoint not found");
}

#[tokio::test(start_paused = true)]
async fn test_wrong_method_is_enveloped() {
    let app = create_test_app();

    let (status, body) = post(&app, "/api/servers", json!({})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "method not allowed");

    let (status, body) = get(&app, "/api/deploy").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
}
