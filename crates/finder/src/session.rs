use {
    crate::*,
    base::*,
    std::sync::{Arc, Mutex},
    tokio::{sync::watch, task::JoinHandle},
    video::{CaptureSource, VideoFrame},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming,
}

/// Owns the camera, the channel and the sampling timer of one client.
///
/// `start` and `stop` are the only ways in and out of streaming. `stop`
/// releases everything at once; `start` waits until whatever the previous
/// run released is really gone before acquiring anything new.
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    epoch: Epoch,
    capture: CaptureSource,
    channel: Option<StreamChannel>,
    sampler: Option<JoinHandle<()>>,
    retired: Vec<JoinHandle<()>>,
    store: DetectionStore,
    stats: StatsTracker,
    model_info: Arc<Mutex<Option<ModelInfo>>>,
    model_task: JoinHandle<()>,
    error: Option<String>,
}

impl Session {
    /// Create an idle session and fetch the model info in the background.
    /// Must be called from within a tokio runtime.
    pub fn new(config: SessionConfig) -> Self {
        let epoch = Epoch::new();
        let model_info = Arc::new(Mutex::new(None));
        let model_task = tokio::spawn({
            let config = config.clone();
            let model_info = model_info.clone();
            async move {
                match fetch_model_info(&config).await {
                    Ok(info) => {
                        log_info!("session: model {} on {}", info.model_type, info.device);
                        *model_info.lock().unwrap_or_else(|e| e.into_inner()) = Some(info);
                    }
                    Err(error) => log_warn!("session: model info unavailable: {}", error),
                }
            }
        });
        Self {
            config,
            state: SessionState::Idle,
            stats: StatsTracker::new(epoch.clone()),
            epoch,
            capture: CaptureSource::new(),
            channel: None,
            sampler: None,
            retired: Vec::new(),
            store: DetectionStore::new(),
            model_info,
            model_task,
            error: None,
        }
    }

    /// Start streaming. Camera, channel and sampler are each attempted even
    /// when an earlier one failed; failures end up in `error()`.
    pub async fn start(&mut self) {
        if self.state == SessionState::Streaming {
            return;
        }
        self.error = None;
        self.wait_released().await;
        let generation = self.epoch.advance();
        self.state = SessionState::Streaming;
        log_info!("session: starting, generation {}", generation);

        let frames = match self.capture.start(self.config.capture()).await {
            Ok(videoin) => {
                log_info!(
                    "session: camera delivers {} {:?} at {} fps",
                    videoin.size(),
                    videoin.format(),
                    videoin.frame_rate()
                );
                videoin.frames()
            }
            Err(error) => {
                log_error!("session: camera unavailable: {}", error);
                self.error = Some(format!("camera: {}", error));
                // the sampler still runs, it just never finds a frame
                watch::channel(None).1
            }
        };

        let options = ChannelOptions::default()
            .with_connect_timeout(self.config.connect_timeout())
            .with_stats(self.stats.clone());
        let channel = StreamChannel::connect(
            &self.config.detect_endpoint(),
            self.store.clone(),
            options,
        );

        let sampler = FrameSampler::new(
            frames,
            channel.sender(),
            self.epoch.clone(),
            self.stats.clone(),
            &self.config,
        );
        self.sampler = Some(sampler.spawn());
        self.channel = Some(channel);
    }

    /// Stop streaming and release everything. Returns without waiting; the
    /// next `start` waits for the release to finish.
    pub fn stop(&mut self) {
        if self.state == SessionState::Idle {
            return;
        }
        let finished = self.epoch.current();
        self.epoch.advance();
        if let Some(sampler) = self.sampler.take() {
            sampler.abort();
            self.retired.push(sampler);
        }
        if let Some(channel) = self.channel.take() {
            if let Some(driver) = channel.into_retired() {
                self.retired.push(driver);
            }
        }
        self.capture.stop();
        self.store.clear();
        self.stats.reset();
        self.state = SessionState::Idle;
        log_info!("session: stopped generation {}", finished);
    }

    /// Start when idle, stop when streaming.
    pub async fn toggle(&mut self) {
        match self.state {
            SessionState::Idle => self.start().await,
            SessionState::Streaming => self.stop(),
        }
    }

    /// Wait until tasks and devices released by `stop` are gone.
    pub async fn wait_released(&mut self) {
        for task in self.retired.drain(..) {
            match task.await {
                Ok(()) => {}
                Err(error) if error.is_cancelled() => {}
                Err(error) => log_warn!("session: task ended abnormally: {}", error),
            }
        }
        self.capture.wait_released().await;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn streaming(&self) -> bool {
        self.state == SessionState::Streaming
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.channel
            .as_ref()
            .map(|channel| channel.state())
            .unwrap_or(ConnectionState::Disconnected)
    }

    pub fn stats(&self) -> ThroughputStats {
        self.stats.snapshot()
    }

    pub fn detections(&self) -> DetectionSet {
        self.store.current()
    }

    pub fn store(&self) -> &DetectionStore {
        &self.store
    }

    pub fn model_info(&self) -> Option<ModelInfo> {
        self.model_info
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The last start problem, or a failed connection.
    pub fn error(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(error.clone());
        }
        if self.connection_state() == ConnectionState::Errored {
            return Some(format!(
                "connection to {} failed",
                self.config.detect_endpoint()
            ));
        }
        None
    }

    /// Resolution the camera actually delivers; `None` while not capturing.
    pub fn native_size(&self) -> Option<Vec2<usize>> {
        self.capture.handle().map(|videoin| videoin.size())
    }

    pub fn current_frame(&self) -> Option<VideoFrame> {
        self.capture.handle().and_then(|videoin| videoin.latest())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
        self.model_task.abort();
    }
}
