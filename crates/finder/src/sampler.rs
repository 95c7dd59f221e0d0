use {
    crate::*,
    base::*,
    std::time::Duration,
    tokio::{
        sync::watch,
        task::JoinHandle,
        time::MissedTickBehavior,
    },
    video::VideoFrame,
};

/// What one sampling tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Handed to the channel with this sequence number.
    Sent(u64),
    /// Capture has not produced a frame yet.
    NoFrame,
    /// Encoding failed, or the result exceeded the payload limit.
    Skipped,
    /// The stream was stopped while the frame was being encoded.
    Stale,
    /// The channel was not connected or still busy with the previous frame.
    Rejected,
}

/// Periodically encodes the latest camera frame and pushes it to the channel.
pub struct FrameSampler {
    frames: watch::Receiver<Option<VideoFrame>>,
    sender: FrameSender,
    epoch: Epoch,
    generation: u64,
    stats: StatsTracker,
    interval: Duration,
    quality: u8,
    max_payload_size: usize,
    sequence: u64,
}

impl FrameSampler {
    /// The sampler belongs to the epoch's current generation; it stops
    /// producing as soon as the epoch advances.
    pub fn new(
        frames: watch::Receiver<Option<VideoFrame>>,
        sender: FrameSender,
        epoch: Epoch,
        stats: StatsTracker,
        config: &SessionConfig,
    ) -> Self {
        let generation = epoch.current();
        Self {
            frames,
            sender,
            epoch,
            generation,
            stats,
            interval: config.sample_interval(),
            quality: config.jpeg_quality(),
            max_payload_size: config.max_payload_size(),
            sequence: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn tick(&mut self) -> SampleOutcome {
        let Some(frame) = self.frames.borrow().clone() else {
            return SampleOutcome::NoFrame;
        };
        let stamped = Stamped {
            epoch: self.generation,
            inner: frame.captured_at_ms,
        };

        let encoded = match image::encode_jpeg(frame.image, self.quality).await {
            Ok(encoded) => encoded,
            Err(error) => {
                log_warn!("sampler: encoding failed: {}", error);
                return SampleOutcome::Skipped;
            }
        };
        if encoded.len() > self.max_payload_size {
            log_warn!(
                "sampler: dropping {} byte frame, limit is {}",
                encoded.len(),
                self.max_payload_size
            );
            return SampleOutcome::Skipped;
        }
        let Some(captured_at_ms) = stamped.into_current(&self.epoch) else {
            log_debug!("sampler: discarding frame encoded for a stopped stream");
            return SampleOutcome::Stale;
        };

        let sequence_number = self.sequence + 1;
        let payload = FramePayload {
            encoded_image: encoded,
            captured_at_ms,
            sequence_number,
        };
        if !self.sender.send(payload) {
            return SampleOutcome::Rejected;
        }
        self.sequence = sequence_number;
        self.stats.record_send(self.generation, now_ms());
        SampleOutcome::Sent(sequence_number)
    }

    /// Run `tick` every interval until the generation ends or the task is
    /// aborted.
    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            log_debug!(
                "sampler: started, generation {}, every {:?}",
                self.generation,
                self.interval
            );
            while self.epoch.is_current(self.generation) {
                ticker.tick().await;
                self.tick().await;
            }
            log_debug!("sampler: generation {} finished", self.generation);
        })
    }
}
