use {
    base::Vec2,
    std::{
        path::PathBuf,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    },
};

pub const DEFAULT_SIZE: Vec2<usize> = Vec2::new(640, 480);
pub const DEFAULT_FRAME_RATE: f32 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureBackend {
    /// Synthetic moving test pattern, needs no hardware.
    Pattern,
    /// Video4Linux device; `None` picks the first one.
    V4l2 { path: Option<PathBuf> },
}

impl CaptureBackend {
    /// Parse `pattern`, `v4l2` or a device path such as `/dev/video2`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "pattern" => Some(CaptureBackend::Pattern),
            "v4l2" => Some(CaptureBackend::V4l2 { path: None }),
            path if path.starts_with("/dev/") => Some(CaptureBackend::V4l2 {
                path: Some(PathBuf::from(path)),
            }),
            _ => None,
        }
    }
}

impl Default for CaptureBackend {
    fn default() -> Self {
        if cfg!(feature = "v4l2") {
            CaptureBackend::V4l2 { path: None }
        } else {
            CaptureBackend::Pattern
        }
    }
}

/// Counts devices that are currently open, and the most ever open at once.
#[derive(Debug, Clone, Default)]
pub struct OpenTracker {
    inner: Arc<(AtomicUsize, AtomicUsize)>,
}

impl OpenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_count(&self) -> usize {
        self.inner.0.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.inner.1.load(Ordering::SeqCst)
    }

    pub(crate) fn opened(&self) {
        let now = self.inner.0.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.1.fetch_max(now, Ordering::SeqCst);
    }

    pub(crate) fn closed(&self) {
        self.inner.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// What to open and what to ask it for.
///
/// Size and frame rate are hints; the device decides, and `VideoIn` reports
/// what it actually got.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    backend: CaptureBackend,
    size: Vec2<usize>,
    frame_rate: f32,
    tracker: Option<OpenTracker>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            backend: CaptureBackend::default(),
            size: DEFAULT_SIZE,
            frame_rate: DEFAULT_FRAME_RATE,
            tracker: None,
        }
    }
}

impl CaptureConfig {
    pub fn backend(&self) -> &CaptureBackend {
        &self.backend
    }

    pub fn size(&self) -> Vec2<usize> {
        self.size
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn tracker(&self) -> Option<&OpenTracker> {
        self.tracker.as_ref()
    }

    pub fn with_backend(mut self, backend: CaptureBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_size(mut self, size: Vec2<usize>) -> Self {
        self.size = size;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_tracker(mut self, tracker: OpenTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }
}
