#![allow(dead_code)]

use {
    com::WsServer,
    finder::{ConnectionState, DetectionRecord, ResultMessage},
    std::{net::SocketAddr, time::Duration},
    tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        sync::watch,
        time::{Instant, sleep, timeout},
    },
};

pub const WAIT: Duration = Duration::from_secs(5);

/// A detection service stand-in accepting websocket clients on any path.
pub async fn fake_service() -> WsServer {
    WsServer::bind("127.0.0.1:0").await.expect("bind failed")
}

pub fn endpoint(server: &WsServer) -> String {
    format!("ws://{}/api/ws/detect", server.local_addr())
}

pub fn backend_url(server: &WsServer) -> String {
    format!("http://{}", server.local_addr())
}

/// An address nothing listens on.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let addr = listener.local_addr().expect("no addr");
    drop(listener);
    addr
}

pub async fn wait_for_state(
    rx: &mut watch::Receiver<ConnectionState>,
    target: ConnectionState,
    limit: Duration,
) -> bool {
    let deadline = Instant::now() + limit;
    loop {
        if *rx.borrow_and_update() == target {
            return true;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, rx.changed()).await {
            Ok(Ok(())) => {}
            _ => return *rx.borrow() == target,
        }
    }
}

pub async fn wait_for_clients(server: &WsServer, count: usize) {
    let deadline = Instant::now() + WAIT;
    while server.client_count().await != count {
        assert!(Instant::now() < deadline, "expected {} clients", count);
        sleep(Duration::from_millis(10)).await;
    }
}

/// Wait until `check` holds, polling every 10 ms.
pub async fn eventually(limit: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    while !check() {
        if Instant::now() >= deadline {
            return false;
        }
        sleep(Duration::from_millis(10)).await;
    }
    true
}

pub fn bottle_message() -> String {
    r#"{"detections":[{"bbox":[10,20,110,220],"class_name":"bottle","confidence":0.87}],"frame_count":5}"#
        .to_string()
}

pub fn result_json(detections: Vec<DetectionRecord>, frame_count: u64) -> String {
    serde_json::to_string(&ResultMessage {
        detections: Some(detections),
        frame_count,
        timestamp: None,
        error: None,
    })
    .expect("serialize failed")
}

/// Answer HTTP GETs with canned `(path, status line, body)` responses; any
/// other path gets a 404.
pub async fn serve_http(routes: Vec<(&'static str, &'static str, &'static str)>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().expect("no addr");
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = routes
                    .iter()
                    .find(|(route, _, _)| *route == path)
                    .map(|(_, status, body)| (*status, *body))
                    .unwrap_or(("404 Not Found", "{}"));
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}
