use {
    base::*,
    finder::{
        ChannelOptions, ConnectionState, DetectionStore, FrameSampler, SessionConfig,
        StatsTracker, StreamChannel, fetch_health, fetch_model_info,
    },
    std::time::Duration,
    tokio::time::{sleep, timeout},
    video::{CaptureBackend, CaptureSource},
};

const DEFAULT_SECONDS: u64 = 3;

/// Smoke test against a running detection service: health, model info, then
/// a few seconds of synthetic frames with every result printed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    base::init_stdout_logger_from_env();

    let mut args = std::env::args().skip(1);
    let mut config = SessionConfig::from_env();
    if let Some(url) = args.next() {
        config = config.with_backend_url(url);
    }
    let seconds = args
        .next()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_SECONDS);
    let capture_config = config.capture().clone().with_backend(CaptureBackend::Pattern);

    log_info!("Probing {}", config.backend_url());

    match fetch_health(&config).await {
        Ok(health) => log_info!(
            "health: {} (model loaded: {}, device: {})",
            health.status,
            health.model_loaded,
            health.device.as_deref().unwrap_or("?")
        ),
        Err(error) => log_warn!("health: {}", error),
    }
    match fetch_model_info(&config).await {
        Ok(info) => log_info!(
            "model: {} on {}, {} classes, status {}",
            info.model_type,
            info.device,
            info.classes.len(),
            info.status.as_deref().unwrap_or("?")
        ),
        Err(error) => log_warn!("model info: {}", error),
    }

    let epoch = Epoch::new();
    let stats = StatsTracker::new(epoch.clone());
    let store = DetectionStore::new();
    let channel = StreamChannel::connect(
        &config.detect_endpoint(),
        store.clone(),
        ChannelOptions::default()
            .with_connect_timeout(config.connect_timeout())
            .with_stats(stats.clone()),
    );

    let mut state = channel.subscribe();
    let settled = timeout(
        config.connect_timeout() + Duration::from_secs(1),
        state.wait_for(|state| *state != ConnectionState::Connecting),
    )
    .await
    .map(|result| result.map(|current| *current));
    if !matches!(settled, Ok(Ok(ConnectionState::Connected))) {
        log_error!("could not connect to {}", config.detect_endpoint());
        return Err(format!("connection {}", channel.state()).into());
    }

    let mut capture = CaptureSource::new();
    let frames = capture.start(&capture_config).await?.frames();
    let sampler = FrameSampler::new(frames, channel.sender(), epoch.clone(), stats.clone(), &config).spawn();

    let mut results = store.subscribe();
    let mut received = 0u64;
    let deadline = sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let set = results.borrow_and_update().clone();
                received += 1;
                let labels: Vec<String> = set.detections.iter().map(|d| d.label()).collect();
                log_info!("frame {}: {} detections {:?}", set.frame_count, set.len(), labels);
            }
        }
    }

    epoch.advance();
    sampler.abort();
    channel.close();
    capture.stop();
    capture.wait_released().await;

    let summary = stats.snapshot();
    log_info!(
        "sent {} frames, received {} results, last latency {:?} ms",
        summary.frames_sent,
        received,
        summary.last_latency_ms
    );
    if received == 0 {
        return Err("no detection results received".into());
    }
    Ok(())
}
