mod common;

use {
    base::Level,
    common::*,
    finder::{ChannelOptions, ConnectionState, DetectionStore, StreamChannel},
    tokio::time::timeout,
};

// one test per binary: the logger is process-wide
#[tokio::test]
async fn channel_logs_bad_and_failed_messages() {
    let logger = base::init_memory_logger();
    base::set_max_level(Level::Debug);

    let server = fake_service().await;
    let store = DetectionStore::new();
    let channel = StreamChannel::connect(&endpoint(&server), store.clone(), ChannelOptions::default());
    let mut state = channel.subscribe();
    assert!(wait_for_state(&mut state, ConnectionState::Connected, WAIT).await);
    wait_for_clients(&server, 1).await;

    let mut rx = store.subscribe();
    server.broadcast_text("not json".to_string()).await.expect("broadcast failed");
    server
        .broadcast_text(r#"{"error":"Failed to process frame","detections":[]}"#.to_string())
        .await
        .expect("broadcast failed");
    timeout(WAIT, rx.changed()).await.expect("no update").expect("store gone");

    assert!(logger.contains(Level::Warn, "malformed message"));
    assert!(logger.contains(Level::Warn, "Failed to process frame"));
    assert!(logger.contains(Level::Info, "connected to"));
    assert!(logger.contains(Level::Debug, "connecting -> connected"));

    channel.close();
    assert!(logger.contains(Level::Debug, "connected -> disconnected"));
}
