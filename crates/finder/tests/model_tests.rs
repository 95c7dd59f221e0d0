mod common;

use {
    common::*,
    finder::{SessionConfig, fetch_health, fetch_model_info},
    std::time::Duration,
};

fn config_for(addr: std::net::SocketAddr) -> SessionConfig {
    SessionConfig::default()
        .with_backend_url(format!("http://{}", addr))
        .with_http_timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn model_info_with_all_fields() {
    let addr = serve_http(vec![(
        "/api/model-info",
        "200 OK",
        r#"{"model_type":"YOLOv8","device":"cuda","classes":["person","bottle"],"status":"ready"}"#,
    )])
    .await;
    let info = fetch_model_info(&config_for(addr)).await.expect("fetch failed");
    assert_eq!(info.model_type, "YOLOv8");
    assert_eq!(info.device, "cuda");
    assert_eq!(info.classes.len(), 2);
    assert_eq!(info.status.as_deref(), Some("ready"));
}

#[tokio::test]
async fn model_info_minimal() {
    let addr = serve_http(vec![("/api/model-info", "200 OK", r#"{"model_type":"YOLOv8","device":"cpu"}"#)]).await;
    let info = fetch_model_info(&config_for(addr)).await.expect("fetch failed");
    assert!(info.classes.is_empty());
    assert_eq!(info.status, None);
}

#[tokio::test]
async fn model_not_loaded_is_an_error() {
    let addr = serve_http(vec![("/api/model-info", "503 Service Unavailable", r#"{"detail":"Model not loaded"}"#)]).await;
    assert!(fetch_model_info(&config_for(addr)).await.is_err());
}

#[tokio::test]
async fn health_check() {
    let addr = serve_http(vec![(
        "/api/health",
        "200 OK",
        r#"{"status":"healthy","model_loaded":true,"device":"cpu"}"#,
    )])
    .await;
    let health = fetch_health(&config_for(addr)).await.expect("fetch failed");
    assert!(health.is_ready());
    assert_eq!(health.device.as_deref(), Some("cpu"));
}

#[tokio::test]
async fn health_without_model() {
    let addr = serve_http(vec![("/api/health", "200 OK", r#"{"status":"healthy","model_loaded":false}"#)]).await;
    let health = fetch_health(&config_for(addr)).await.expect("fetch failed");
    assert!(!health.is_ready());
}

#[tokio::test]
async fn unreachable_backend() {
    let config = config_for(closed_addr());
    assert!(fetch_health(&config).await.is_err());
    assert!(fetch_model_info(&config).await.is_err());
}
