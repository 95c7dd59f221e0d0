use {
    crate::*,
    base::*,
    com::{ComError, WsClient},
    std::{
        sync::{Arc, Mutex},
        time::Duration,
    },
    tokio::{
        sync::{mpsc, watch},
        task::JoinHandle,
    },
};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ChannelOptions {
    connect_timeout: Duration,
    stats: Option<StatsTracker>,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            stats: None,
        }
    }
}

impl ChannelOptions {
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Record round-trip latency from echoed timestamps into `stats`.
    pub fn with_stats(mut self, stats: StatsTracker) -> Self {
        self.stats = Some(stats);
        self
    }
}

fn transition(state: &watch::Sender<ConnectionState>, event: ChannelEvent) {
    state.send_if_modified(|current| {
        let next = current.apply(event);
        if next == *current {
            return false;
        }
        log_debug!("channel: {} -> {} ({:?})", current, next, event);
        *current = next;
        true
    });
}

// open while the channel may still write to the store
type Gate = Arc<Mutex<bool>>;

fn gate_open(gate: &Gate) -> bool {
    *gate.lock().unwrap_or_else(|e| e.into_inner())
}

/// Cloneable handle for pushing frames into a channel.
#[derive(Debug, Clone)]
pub struct FrameSender {
    state: watch::Receiver<ConnectionState>,
    outbound: mpsc::Sender<FramePayload>,
}

impl FrameSender {
    /// Hand a frame to the channel.
    ///
    /// Returns `false` and drops the frame when the channel is not connected
    /// or the previous frame is still being written.
    pub fn send(&self, payload: FramePayload) -> bool {
        if !self.state.borrow().is_connected() {
            return false;
        }
        match self.outbound.try_send(payload) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(payload)) => {
                log_debug!(
                    "channel: frame {} dropped, previous frame still in flight",
                    payload.sequence_number
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

/// Duplex websocket link to the detection service.
///
/// Frames go out through `send`; every result that comes back replaces the
/// contents of the `DetectionStore`. One instance makes exactly one connection
/// attempt and never reconnects.
pub struct StreamChannel {
    state: Arc<watch::Sender<ConnectionState>>,
    sender: FrameSender,
    gate: Gate,
    driver: Option<JoinHandle<()>>,
}

impl StreamChannel {
    /// Start connecting to `endpoint` (`ws://host:port/path`).
    ///
    /// Returns immediately in `Connecting`; the handshake runs on a spawned
    /// task, so this must be called from within a tokio runtime.
    pub fn connect(endpoint: &str, store: DetectionStore, options: ChannelOptions) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let state = Arc::new(state_tx);
        transition(&state, ChannelEvent::Connect);

        let (outbound_tx, outbound_rx) = mpsc::channel(1);
        let gate: Gate = Arc::new(Mutex::new(true));

        let driver = tokio::spawn(drive(
            endpoint.to_string(),
            state.clone(),
            gate.clone(),
            store,
            options,
            outbound_rx,
        ));

        Self {
            state,
            sender: FrameSender {
                state: state_rx,
                outbound: outbound_tx,
            },
            gate,
            driver: Some(driver),
        }
    }

    pub fn send(&self, payload: FramePayload) -> bool {
        self.sender.send(payload)
    }

    pub fn sender(&self) -> FrameSender {
        self.sender.clone()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Shut the channel down. Safe to call repeatedly and from any state.
    ///
    /// Once this returns the store will not be written again and no new frame
    /// is accepted.
    pub fn close(&self) {
        *self.gate.lock().unwrap_or_else(|e| e.into_inner()) = false;
        transition(&self.state, ChannelEvent::Close);
        if let Some(driver) = &self.driver {
            driver.abort();
        }
    }

    /// Close, and hand back the aborted driver task so the caller can wait
    /// for the socket to be fully released.
    pub fn into_retired(mut self) -> Option<JoinHandle<()>> {
        self.close();
        self.driver.take()
    }
}

impl Drop for StreamChannel {
    fn drop(&mut self) {
        self.close();
    }
}

fn apply_result(text: &str, gate: &Gate, store: &DetectionStore, stats: Option<&StatsTracker>) {
    let message = match ResultMessage::parse(text) {
        Ok(message) => message,
        Err(error) => {
            log_warn!("channel: discarding {}", error);
            return;
        }
    };
    if let Some(error) = &message.error {
        log_warn!("channel: service reported an error: {}", error);
    }
    let received_at_ms = now_ms();

    // held across the write so close() cannot slip in between
    let open = gate.lock().unwrap_or_else(|e| e.into_inner());
    if !*open {
        return;
    }
    if let (Some(stats), Some(timestamp)) = (stats, message.timestamp) {
        stats.record_latency(timestamp, received_at_ms);
    }
    store.replace(message.into_set());
}

async fn drive(
    endpoint: String,
    state: Arc<watch::Sender<ConnectionState>>,
    gate: Gate,
    store: DetectionStore,
    options: ChannelOptions,
    mut outbound: mpsc::Receiver<FramePayload>,
) {
    let client =
        match tokio::time::timeout(options.connect_timeout, WsClient::connect(&endpoint)).await {
            Ok(Ok(client)) => client,
            Ok(Err(error)) => {
                log_warn!("channel: connecting to {} failed: {}", endpoint, error);
                transition(&state, ChannelEvent::Failed);
                return;
            }
            Err(_) => {
                log_warn!(
                    "channel: connecting to {} timed out after {:?}",
                    endpoint,
                    options.connect_timeout
                );
                transition(&state, ChannelEvent::Failed);
                return;
            }
        };
    transition(&state, ChannelEvent::Opened);
    log_info!("channel: connected to {}", endpoint);

    let (mut sender, mut receiver) = client.split();
    loop {
        tokio::select! {
            inbound = receiver.recv_text() => match inbound {
                Ok(text) => apply_result(&text, &gate, &store, options.stats.as_ref()),
                Err(ComError::MessageTooLarge(len)) => {
                    log_warn!("channel: discarding {} byte message", len);
                }
                Err(ComError::ConnectionClosed) => {
                    log_info!("channel: service closed the connection");
                    transition(&state, ChannelEvent::RemoteClosed);
                    break;
                }
                Err(error) => {
                    log_warn!("channel: receive failed: {}", error);
                    transition(&state, ChannelEvent::Failed);
                    break;
                }
            },
            frame = outbound.recv() => {
                let Some(payload) = frame else {
                    break;
                };
                if !gate_open(&gate) {
                    break;
                }
                if let Err(error) = sender.send_json(&payload.to_message()).await {
                    log_warn!("channel: sending frame {} failed: {}", payload.sequence_number, error);
                    transition(&state, ChannelEvent::Failed);
                    break;
                }
            }
        }
    }
    if let Err(error) = sender.close().await {
        log_debug!("channel: close failed: {}", error);
    }
}
