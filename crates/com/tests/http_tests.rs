use {
    com::{ComError, http::get_json},
    serde::Deserialize,
    std::time::Duration,
    tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    },
};

#[derive(Debug, Deserialize)]
struct Info {
    model_type: String,
    device: String,
}

// Serve one canned HTTP response, then close.
async fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().expect("no addr");
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}/api/model-info", addr)
}

#[tokio::test]
async fn decodes_json_body() {
    let url = serve_once("200 OK", r#"{"model_type":"yolov8n","device":"cuda"}"#).await;
    let info: Info = get_json(&url, Duration::from_secs(5))
        .await
        .expect("get failed");
    assert_eq!(info.model_type, "yolov8n");
    assert_eq!(info.device, "cuda");
}

#[tokio::test]
async fn non_success_status_is_http_error() {
    let url = serve_once("503 Service Unavailable", "{}").await;
    let result = get_json::<Info>(&url, Duration::from_secs(5)).await;
    assert!(matches!(result, Err(ComError::Http(_))));
}

#[tokio::test]
async fn malformed_body_is_json_error() {
    let url = serve_once("200 OK", "not json").await;
    let result = get_json::<Info>(&url, Duration::from_secs(5)).await;
    assert!(matches!(result, Err(ComError::Json(_))));
}

#[tokio::test]
async fn unreachable_host_is_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let addr = listener.local_addr().expect("no addr");
    drop(listener);

    let result = get_json::<Info>(&format!("http://{}/api/health", addr), Duration::from_secs(2)).await;
    assert!(matches!(result, Err(ComError::Http(_))));
}
