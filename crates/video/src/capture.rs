use {
    crate::*,
    base::*,
    tokio::task::JoinHandle,
};

/// Owns the one camera handle a session may hold.
///
/// `start` first waits for any previously released handle to finish closing
/// its device, so two handles are never open at once.
#[derive(Default)]
pub struct CaptureSource {
    handle: Option<VideoIn>,
    retired: Option<JoinHandle<()>>,
}

impl CaptureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn start(&mut self, config: &CaptureConfig) -> Result<&VideoIn, VideoError> {
        self.stop();
        self.wait_released().await;
        let videoin = VideoIn::open(config).await?;
        Ok(self.handle.insert(videoin))
    }

    /// Release the handle. Safe to call when nothing is open.
    pub fn stop(&mut self) {
        if let Some(videoin) = self.handle.take() {
            log_debug!("capture: releasing camera");
            if let Some(worker) = videoin.release() {
                self.retired = Some(worker);
            }
        }
    }

    /// Wait until a released device is fully closed.
    pub async fn wait_released(&mut self) {
        if let Some(worker) = self.retired.take() {
            if let Err(error) = worker.await {
                log_warn!("capture: video worker ended abnormally: {}", error);
            }
        }
    }

    pub fn handle(&self) -> Option<&VideoIn> {
        self.handle.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}
