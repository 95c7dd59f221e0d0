mod common;

use {
    common::*,
    finder::{ConnectionState, Session, SessionConfig, SessionState},
    std::time::Duration,
    tokio::time::{sleep, timeout},
    video::{CaptureBackend, CaptureConfig, OpenTracker},
};

fn pattern_config(backend_url: String, tracker: &OpenTracker) -> SessionConfig {
    SessionConfig::default()
        .with_backend_url(backend_url)
        .with_sample_interval(Duration::from_millis(30))
        .with_http_timeout(Duration::from_millis(500))
        .with_capture(
            CaptureConfig::default()
                .with_backend(CaptureBackend::Pattern)
                .with_tracker(tracker.clone()),
        )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn streams_frames_to_the_service() {
    let mut server = fake_service().await;
    let tracker = OpenTracker::new();
    let mut session = Session::new(pattern_config(backend_url(&server), &tracker));
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);

    session.start().await;
    assert!(session.streaming());
    assert_eq!(session.error(), None);
    assert_eq!(tracker.open_count(), 1);
    assert!(session.native_size().is_some());

    let (addr, _) = timeout(WAIT, server.recv()).await.expect("no frame").expect("recv failed");
    assert_eq!(session.connection_state(), ConnectionState::Connected);
    assert!(eventually(WAIT, || session.stats().frames_sent >= 1).await);

    server
        .send_text_to(addr, bottle_message())
        .await
        .expect("reply failed");
    assert!(eventually(WAIT, || session.store().frame_count() == 5).await);
    assert_eq!(session.detections().detections[0].class_name, "bottle");

    session.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_releases_everything_and_silences_the_channel() {
    let mut server = fake_service().await;
    let tracker = OpenTracker::new();
    let mut session = Session::new(pattern_config(backend_url(&server), &tracker));
    session.start().await;
    timeout(WAIT, server.recv()).await.expect("no frame").expect("recv failed");

    let sent_before_stop = session.stats().frames_sent;
    session.stop();
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);
    assert_eq!(session.stats().frames_sent, 0);
    assert!(session.detections().is_empty());
    assert!(session.native_size().is_none());

    // one frame was received above and at most one send can race `stop`,
    // so only frames counted before it may still arrive
    let mut late = 0_u64;
    while timeout(Duration::from_millis(150), server.recv()).await.is_ok() {
        late += 1;
        assert!(
            late <= sent_before_stop,
            "{} frames arrived after stop, {} were sent before",
            late,
            sent_before_stop
        );
    }
    assert!(timeout(Duration::from_millis(500), server.recv()).await.is_err());
    assert_eq!(session.stats().frames_sent, 0);

    session.wait_released().await;
    assert_eq!(tracker.open_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn restart_never_overlaps_resources() {
    let server = fake_service().await;
    let tracker = OpenTracker::new();
    let mut session = Session::new(pattern_config(backend_url(&server), &tracker));

    for _ in 0..3 {
        session.start().await;
        assert_eq!(tracker.open_count(), 1);
        session.stop();
        session.start().await;
        session.stop();
    }
    session.wait_released().await;

    assert_eq!(tracker.peak(), 1);
    assert_eq!(tracker.open_count(), 0);
    let deadline = tokio::time::Instant::now() + WAIT;
    while server.client_count().await != 0 {
        assert!(tokio::time::Instant::now() < deadline, "socket left open");
        sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_service_keeps_camera_running() {
    let tracker = OpenTracker::new();
    let config = pattern_config(format!("http://{}", closed_addr()), &tracker)
        .with_connect_timeout(Duration::from_secs(1));
    let mut session = Session::new(config);
    session.start().await;

    assert!(session.streaming());
    assert_eq!(tracker.open_count(), 1);
    assert!(eventually(WAIT, || session.connection_state() == ConnectionState::Errored).await);
    assert!(session.error().expect("no error").contains("connection"));

    sleep(Duration::from_millis(200)).await;
    assert_eq!(session.stats().frames_sent, 0);
    session.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_camera_still_connects() {
    let mut server = fake_service().await;
    let config = SessionConfig::default()
        .with_backend_url(backend_url(&server))
        .with_capture(CaptureConfig::default().with_backend(CaptureBackend::V4l2 {
            path: Some("/dev/video-does-not-exist".into()),
        }));
    let mut session = Session::new(config);
    session.start().await;

    assert!(session.streaming());
    assert!(session.error().expect("no error").starts_with("camera"));
    assert!(session.native_size().is_none());
    assert!(eventually(WAIT, || session.connection_state() == ConnectionState::Connected).await);

    // nothing to sample, so nothing is sent
    assert!(timeout(Duration::from_millis(300), server.recv()).await.is_err());
    session.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn model_info_is_fetched_once_in_background() {
    let addr = serve_http(vec![(
        "/api/model-info",
        "200 OK",
        r#"{"model_type":"YOLOv8","device":"cpu","classes":["bottle","cup"],"status":"ready"}"#,
    )])
    .await;
    let session = Session::new(SessionConfig::default().with_backend_url(format!("http://{}", addr)));
    assert!(eventually(WAIT, || session.model_info().is_some()).await);
    let info = session.model_info().expect("no model info");
    assert_eq!(info.model_type, "YOLOv8");
    assert_eq!(info.classes, vec!["bottle".to_string(), "cup".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn model_info_failure_is_not_fatal() {
    let addr = serve_http(vec![("/api/model-info", "503 Service Unavailable", r#"{"detail":"Model not loaded"}"#)]).await;
    let tracker = OpenTracker::new();
    let mut session = Session::new(pattern_config(format!("http://{}", addr), &tracker));
    sleep(Duration::from_millis(300)).await;
    assert!(session.model_info().is_none());

    session.start().await;
    assert!(session.streaming());
    session.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn toggle_flips_state() {
    let server = fake_service().await;
    let tracker = OpenTracker::new();
    let mut session = Session::new(pattern_config(backend_url(&server), &tracker));
    session.toggle().await;
    assert!(session.streaming());
    session.toggle().await;
    assert!(!session.streaming());
    // stopping twice is harmless
    session.stop();
    assert_eq!(session.state(), SessionState::Idle);
}
