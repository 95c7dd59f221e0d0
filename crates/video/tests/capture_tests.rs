use base::Vec2;
use image::PixelFormat;
use std::path::PathBuf;
use tokio::time::{Duration, sleep, timeout};
use video::{CaptureBackend, CaptureConfig, CaptureSource, OpenTracker, VideoError, VideoIn};

fn pattern(size: Vec2<usize>) -> CaptureConfig {
    CaptureConfig::default()
        .with_backend(CaptureBackend::Pattern)
        .with_size(size)
        .with_frame_rate(50.0)
}

#[tokio::test]
async fn test_pattern_reports_negotiated_format() {
    let videoin = VideoIn::open(&pattern(Vec2::new(64, 48))).await.unwrap();
    assert_eq!(videoin.size(), Vec2::new(64, 48));
    assert_eq!(videoin.format(), PixelFormat::Rgb8);
    assert_eq!(videoin.frame_rate(), 50.0);
}

#[tokio::test]
async fn test_frames_arrive_in_latest_slot() {
    let videoin = VideoIn::open(&pattern(Vec2::new(32, 24))).await.unwrap();
    let mut frames = videoin.frames();
    timeout(Duration::from_secs(5), frames.wait_for(|frame| frame.is_some()))
        .await
        .expect("no frame in time")
        .expect("worker gone");

    let frame = videoin.latest().expect("latest frame");
    assert_eq!(frame.image.size, Vec2::new(32, 24));
    assert_eq!(frame.image.data.len(), 32 * 24 * 3);
    assert!(frame.captured_at_ms > 0);
}

#[tokio::test]
async fn test_release_closes_device() {
    let tracker = OpenTracker::new();
    let videoin = VideoIn::open(&pattern(Vec2::new(16, 16)).with_tracker(tracker.clone()))
        .await
        .unwrap();
    assert_eq!(tracker.open_count(), 1);

    let worker = videoin.release().expect("worker handle");
    timeout(Duration::from_secs(5), worker)
        .await
        .expect("worker did not stop")
        .unwrap();
    assert_eq!(tracker.open_count(), 0);
}

#[tokio::test]
async fn test_missing_device_is_no_device_error() {
    let config = CaptureConfig::default().with_backend(CaptureBackend::V4l2 {
        path: Some(PathBuf::from("/dev/video-does-not-exist")),
    });
    let error = match VideoIn::open(&config).await {
        Ok(_) => panic!("opened a device that does not exist"),
        Err(error) => error,
    };
    assert!(matches!(error, VideoError::NoDevice(_)), "got {error}");
    assert!(error.is_device_error());
}

#[tokio::test]
async fn test_capture_source_stop_is_idempotent() {
    let mut source = CaptureSource::new();
    source.stop();
    source.start(&pattern(Vec2::new(16, 16))).await.unwrap();
    assert!(source.is_active());
    source.stop();
    source.stop();
    assert!(!source.is_active());
    source.wait_released().await;
}

#[tokio::test]
async fn test_restart_never_overlaps_devices() {
    let tracker = OpenTracker::new();
    let config = pattern(Vec2::new(16, 16)).with_tracker(tracker.clone());
    let mut source = CaptureSource::new();

    for _ in 0..5 {
        source.start(&config).await.unwrap();
        sleep(Duration::from_millis(10)).await;
        source.stop();
    }
    source.start(&config).await.unwrap();

    assert_eq!(tracker.peak(), 1);
    assert_eq!(tracker.open_count(), 1);
    source.stop();
    source.wait_released().await;
    assert_eq!(tracker.open_count(), 0);
}
