use {
    crate::*,
    base::*,
    image::{Image, PixelFormat},
    std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    tokio::{
        sync::{oneshot, watch},
        task::{JoinHandle, spawn_blocking},
    },
};

mod pattern;

#[cfg(feature = "v4l2")]
mod v4l2;

// delay before reopening a device after a capture failure
const WAIT_BEFORE_RECONNECT_MS: u64 = 100;

/// What the device actually agreed to deliver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Negotiated {
    pub size: Vec2<usize>,
    pub format: PixelFormat,
    pub frame_rate: f32,
}

pub(crate) trait VideoInDevice: Send {
    fn open(&mut self, config: &CaptureConfig) -> Result<Negotiated, VideoError>; // open the device, return what was actually set
    fn close(&mut self); // close the device, if open
    fn blocking_capture(&mut self) -> Result<Image, VideoError>; // capture a frame
}

/// An open camera. Dropping it (or calling `release`) stops the worker and
/// closes the device.
pub struct VideoIn {
    frames: watch::Receiver<Option<VideoFrame>>,
    cancel: Arc<AtomicBool>,
    negotiated: Negotiated,
    join_handle: Option<JoinHandle<()>>,
}

impl VideoIn {
    fn create_device(config: &CaptureConfig) -> Result<Box<dyn VideoInDevice>, VideoError> {
        match config.backend() {
            CaptureBackend::Pattern => Ok(Box::new(pattern::Pattern::new())),
            #[cfg(feature = "v4l2")]
            CaptureBackend::V4l2 { .. } => Ok(Box::new(v4l2::V4l2::new())),
            #[cfg(not(feature = "v4l2"))]
            CaptureBackend::V4l2 { .. } => Err(VideoError::NoDevice(
                "built without v4l2 support".to_string(),
            )),
        }
    }

    /// Open the configured device and start pumping frames.
    ///
    /// Resolves once the device is open and its format is known.
    pub async fn open(config: &CaptureConfig) -> Result<Self, VideoError> {
        let mut device = Self::create_device(config)?;
        let (frame_tx, frames) = watch::channel::<Option<VideoFrame>>(None);
        let cancel = Arc::new(AtomicBool::new(false));
        let (init_tx, init_rx) = oneshot::channel::<Result<Negotiated, VideoError>>();

        let config = config.clone();
        let worker_cancel = Arc::clone(&cancel);

        // device.open() runs on the same OS thread as blocking_capture()
        let join_handle = spawn_blocking(move || {
            let negotiated = match device.open(&config) {
                Ok(negotiated) => negotiated,
                Err(error) => {
                    let _ = init_tx.send(Err(error));
                    return;
                }
            };
            let tracker = config.tracker().cloned();
            if let Some(tracker) = &tracker {
                tracker.opened();
            }
            if init_tx.send(Ok(negotiated)).is_ok() {
                pump(device.as_mut(), &config, &frame_tx, &worker_cancel);
            }
            device.close();
            if let Some(tracker) = &tracker {
                tracker.closed();
            }
            log_debug!("video worker: device closed");
        });

        let negotiated = init_rx
            .await
            .map_err(|_| VideoError::Device("worker thread died during init".to_string()))??;

        log_info!(
            "camera open: {} {:?} @ {:.1} fps",
            negotiated.size,
            negotiated.format,
            negotiated.frame_rate
        );

        Ok(Self {
            frames,
            cancel,
            negotiated,
            join_handle: Some(join_handle),
        })
    }

    pub fn size(&self) -> Vec2<usize> {
        self.negotiated.size
    }

    pub fn format(&self) -> PixelFormat {
        self.negotiated.format
    }

    pub fn frame_rate(&self) -> f32 {
        self.negotiated.frame_rate
    }

    pub fn negotiated(&self) -> Negotiated {
        self.negotiated
    }

    /// Subscribe to the latest-frame slot. It holds `None` until the device
    /// has produced its first frame.
    pub fn frames(&self) -> watch::Receiver<Option<VideoFrame>> {
        self.frames.clone()
    }

    pub fn latest(&self) -> Option<VideoFrame> {
        self.frames.borrow().clone()
    }

    /// Stop the worker. The returned handle resolves once the device is closed.
    pub fn release(mut self) -> Option<JoinHandle<()>> {
        self.cancel.store(true, Ordering::Relaxed);
        self.join_handle.take()
    }
}

impl Drop for VideoIn {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

fn pump(
    device: &mut dyn VideoInDevice,
    config: &CaptureConfig,
    frame_tx: &watch::Sender<Option<VideoFrame>>,
    cancel: &AtomicBool,
) {
    log_debug!("video worker: starting capture loop");
    while !cancel.load(Ordering::Relaxed) {
        match device.blocking_capture() {
            Ok(image) => {
                frame_tx.send_replace(Some(VideoFrame {
                    image,
                    captured_at_ms: now_ms(),
                }));
            }
            Err(error) => {
                log_error!("video worker: capture failed: {}", error);

                // close, wait, and reopen the device
                loop {
                    if cancel.load(Ordering::Relaxed) {
                        return;
                    }
                    log_info!("video worker: reopening device...");
                    device.close();
                    std::thread::sleep(std::time::Duration::from_millis(
                        WAIT_BEFORE_RECONNECT_MS,
                    ));
                    match device.open(config) {
                        Ok(_) => break,
                        Err(error) => log_warn!("video worker: reopen failed: {}", error),
                    }
                }
            }
        }
    }
}
