use {
    base::Epoch,
    std::sync::{Arc, Mutex},
};

/// Transmission counters shown while streaming.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThroughputStats {
    pub frames_sent: u64,
    /// `1000 / ms since the previous send`, no smoothing. Zero until two
    /// frames went out.
    pub instantaneous_fps: f32,
    /// Round trip derived from the timestamp the service echoes back.
    pub last_latency_ms: Option<u64>,
}

#[derive(Debug, Default)]
struct TrackerState {
    stats: ThroughputStats,
    last_send_ms: Option<u64>,
}

/// Shared, resettable `ThroughputStats`.
///
/// Sends are recorded with the generation they belong to; once the epoch has
/// moved on they are ignored, so a send racing a reset cannot resurrect the
/// counters.
#[derive(Debug, Clone)]
pub struct StatsTracker {
    epoch: Epoch,
    state: Arc<Mutex<TrackerState>>,
}

impl StatsTracker {
    pub fn new(epoch: Epoch) -> Self {
        Self {
            epoch,
            state: Arc::new(Mutex::new(TrackerState::default())),
        }
    }

    pub fn record_send(&self, generation: u64, now_ms: u64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !self.epoch.is_current(generation) {
            return;
        }
        state.stats.frames_sent += 1;
        if let Some(previous) = state.last_send_ms {
            let interval = now_ms.saturating_sub(previous);
            if interval > 0 {
                state.stats.instantaneous_fps = 1000.0 / interval as f32;
            }
        }
        state.last_send_ms = Some(now_ms);
    }

    pub fn record_latency(&self, echoed_timestamp_ms: u64, now_ms: u64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.stats.last_latency_ms = Some(now_ms.saturating_sub(echoed_timestamp_ms));
    }

    pub fn snapshot(&self) -> ThroughputStats {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).stats
    }

    pub fn reset(&self) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = TrackerState::default();
    }
}
