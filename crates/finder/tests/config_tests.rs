use {
    finder::{
        DEFAULT_BACKEND_URL, DEFAULT_JPEG_QUALITY, DEFAULT_SAMPLE_INTERVAL, SessionConfig,
        websocket_base,
    },
    std::{collections::HashMap, path::PathBuf, time::Duration},
    video::CaptureBackend,
};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults() {
    let config = SessionConfig::default();
    assert_eq!(config.backend_url(), DEFAULT_BACKEND_URL);
    assert_eq!(config.sample_interval(), DEFAULT_SAMPLE_INTERVAL);
    assert_eq!(config.sample_interval(), Duration::from_millis(100));
    assert_eq!(config.jpeg_quality(), DEFAULT_JPEG_QUALITY);
    assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    assert_eq!(config.detect_endpoint(), "ws://localhost:8001/api/ws/detect");
    assert_eq!(config.model_info_url(), "http://localhost:8001/api/model-info");
    assert_eq!(config.health_url(), "http://localhost:8001/api/health");
}

#[test]
fn websocket_scheme_substitution() {
    assert_eq!(websocket_base("http://example.org:8001"), "ws://example.org:8001");
    assert_eq!(websocket_base("https://example.org/"), "wss://example.org");
    assert_eq!(websocket_base("ws://already"), "ws://already");
    assert_eq!(websocket_base("10.0.0.2:8001"), "ws://10.0.0.2:8001");
}

#[test]
fn trailing_slash_is_ignored() {
    let config = SessionConfig::default().with_backend_url("https://detector.local/");
    assert_eq!(config.detect_endpoint(), "wss://detector.local/api/ws/detect");
    assert_eq!(config.model_info_url(), "https://detector.local/api/model-info");
}

#[test]
fn environment_overrides() {
    let config = SessionConfig::from_lookup(lookup(&[
        ("BACKEND_URL", "http://10.1.2.3:9000"),
        ("FINDER_CAPTURE", "pattern"),
    ]));
    assert_eq!(config.backend_url(), "http://10.1.2.3:9000");
    assert_eq!(config.capture().backend(), &CaptureBackend::Pattern);
}

#[test]
fn device_selects_v4l2() {
    let config = SessionConfig::from_lookup(lookup(&[("FINDER_DEVICE", "/dev/video2")]));
    assert_eq!(
        config.capture().backend(),
        &CaptureBackend::V4l2 {
            path: Some(PathBuf::from("/dev/video2"))
        }
    );
}

#[test]
fn bad_values_keep_defaults() {
    let config = SessionConfig::from_lookup(lookup(&[
        ("BACKEND_URL", "   "),
        ("FINDER_CAPTURE", "webcam-please"),
    ]));
    assert_eq!(config.backend_url(), DEFAULT_BACKEND_URL);
    assert_eq!(config.capture().backend(), &CaptureBackend::default());
}

#[test]
fn quality_is_clamped() {
    assert_eq!(SessionConfig::default().with_jpeg_quality(0).jpeg_quality(), 1);
    assert_eq!(SessionConfig::default().with_jpeg_quality(250).jpeg_quality(), 100);
}
