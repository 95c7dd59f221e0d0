use {
    base::*,
    std::{path::PathBuf, time::Duration},
    video::{CaptureBackend, CaptureConfig},
};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";
pub const DETECT_PATH: &str = "/api/ws/detect";
pub const MODEL_INFO_PATH: &str = "/api/model-info";
pub const HEALTH_PATH: &str = "/api/health";

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_JPEG_QUALITY: u8 = 80;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
pub const MAX_PAYLOAD_SIZE: usize = 4 * 1024 * 1024;

/// Turn an `http(s)://` base address into the matching `ws(s)://` one.
/// Addresses that already use a websocket scheme are kept.
pub fn websocket_base(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if url.starts_with("ws://") || url.starts_with("wss://") {
        url.to_string()
    } else {
        format!("ws://{}", url)
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    backend_url: String,
    sample_interval: Duration,
    jpeg_quality: u8,
    capture: CaptureConfig,
    connect_timeout: Duration,
    http_timeout: Duration,
    max_payload_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            capture: CaptureConfig::default(),
            connect_timeout: crate::DEFAULT_CONNECT_TIMEOUT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            max_payload_size: MAX_PAYLOAD_SIZE,
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by `BACKEND_URL`, `FINDER_CAPTURE` and `FINDER_DEVICE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup("BACKEND_URL").filter(|url| !url.trim().is_empty()) {
            config = config.with_backend_url(url.trim());
        }
        if let Some(value) = lookup("FINDER_CAPTURE") {
            match CaptureBackend::parse(&value) {
                Some(backend) => config.capture = config.capture.with_backend(backend),
                None => log_warn!("config: ignoring unknown FINDER_CAPTURE value {:?}", value),
            }
        }
        if let Some(device) = lookup("FINDER_DEVICE").filter(|device| !device.trim().is_empty()) {
            config.capture = config.capture.with_backend(CaptureBackend::V4l2 {
                path: Some(PathBuf::from(device.trim())),
            });
        }
        config
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    pub fn capture(&self) -> &CaptureConfig {
        &self.capture
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    pub fn detect_endpoint(&self) -> String {
        format!("{}{}", websocket_base(&self.backend_url), DETECT_PATH)
    }

    pub fn model_info_url(&self) -> String {
        format!("{}{}", self.backend_url.trim_end_matches('/'), MODEL_INFO_PATH)
    }

    pub fn health_url(&self) -> String {
        format!("{}{}", self.backend_url.trim_end_matches('/'), HEALTH_PATH)
    }

    pub fn with_backend_url(mut self, backend_url: impl Into<String>) -> Self {
        self.backend_url = backend_url.into();
        self
    }

    pub fn with_sample_interval(mut self, sample_interval: Duration) -> Self {
        self.sample_interval = sample_interval;
        self
    }

    /// JPEG quality, clamped to 1..=100.
    pub fn with_jpeg_quality(mut self, jpeg_quality: u8) -> Self {
        self.jpeg_quality = jpeg_quality.clamp(1, 100);
        self
    }

    pub fn with_capture(mut self, capture: CaptureConfig) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_http_timeout(mut self, http_timeout: Duration) -> Self {
        self.http_timeout = http_timeout;
        self
    }

    pub fn with_max_payload_size(mut self, max_payload_size: usize) -> Self {
        self.max_payload_size = max_payload_size;
        self
    }
}
