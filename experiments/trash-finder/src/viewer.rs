use {
    base::*,
    finder::{
        Canvas, OverlayRenderer, Session, SessionConfig, composite, fetch_health, font::Font,
    },
    minifb::{Key, KeyRepeat, Window, WindowOptions},
    std::time::Duration,
};

const DISPLAY_SIZE: Vec2<usize> = Vec2::new(960, 720);
const STATUS_HEIGHT: usize = 48;
const BACKGROUND: u32 = 0xFF10_1010;
const STATUS_BACKGROUND: u32 = 0xFF20_2020;
const STATUS_TEXT: u32 = 0xFFE0_E0E0;
const STATUS_ERROR: u32 = 0xFFFF_6060;
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

fn status_bar(session: &Session, font: Font) -> Canvas {
    let mut canvas = Canvas::new(Vec2::new(DISPLAY_SIZE.x, STATUS_HEIGHT));
    canvas.fill(0, 0, DISPLAY_SIZE.x as i32, STATUS_HEIGHT as i32, STATUS_BACKGROUND);

    let model = match session.model_info() {
        Some(info) => format!("{} on {}", info.model_type, info.device),
        None => "model unknown".to_string(),
    };
    let mode = if session.streaming() { "streaming" } else { "idle (S to start)" };
    let first = format!("{} | {} | {}", mode, session.connection_state(), model);

    let stats = session.stats();
    let latency = match stats.last_latency_ms {
        Some(ms) => format!("{} ms", ms),
        None => "-".to_string(),
    };
    let second = format!(
        "sent {} | {:.1} fps | items {} | frame {} | latency {}",
        stats.frames_sent,
        stats.instantaneous_fps,
        session.store().items_detected(),
        session.store().frame_count(),
        latency
    );

    let line = font.line_height() as i32 + 6;
    font.draw(&mut canvas, Vec2::new(6, 6), &first, STATUS_TEXT);
    match session.error() {
        Some(error) => font.draw(&mut canvas, Vec2::new(6, 6 + line), &error, STATUS_ERROR),
        None => font.draw(&mut canvas, Vec2::new(6, 6 + line), &second, STATUS_TEXT),
    }
    canvas
}

// current camera picture scaled to the window, or a blank one
fn picture(session: &Session) -> Vec<u32> {
    let Some(frame) = session.current_frame() else {
        return vec![BACKGROUND; DISPLAY_SIZE.area()];
    };
    match image::image_to_u32(&frame.image) {
        Ok(pixels) => image::scale_u32(&pixels, frame.image.size, DISPLAY_SIZE),
        Err(error) => {
            log_warn!("viewer: cannot show frame: {}", error);
            vec![BACKGROUND; DISPLAY_SIZE.area()]
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    base::init_stdout_logger_from_env();

    let mut config = SessionConfig::from_env();
    if let Some(url) = std::env::args().nth(1) {
        config = config.with_backend_url(url);
    }

    log_info!("Trash Finder");
    log_info!("Backend: {}", config.backend_url());
    log_info!("Controls: S to start/stop, ESC to exit");

    match fetch_health(&config).await {
        Ok(health) if health.is_ready() => log_info!("service is healthy"),
        Ok(health) => log_warn!(
            "service reports {} (model loaded: {})",
            health.status,
            health.model_loaded
        ),
        Err(error) => log_warn!("health check failed: {}", error),
    }

    let mut session = Session::new(config);
    let mut renderer = OverlayRenderer::new(DISPLAY_SIZE);
    let mut detections = session.store().subscribe();
    let mut last_native = Vec2::new(0, 0);
    let font = Font::new(2);

    let mut window = Window::new(
        "Trash Finder - S to start/stop, ESC to exit",
        DISPLAY_SIZE.x,
        DISPLAY_SIZE.y + STATUS_HEIGHT,
        WindowOptions::default(),
    )?;
    // pacing is done with the tokio interval below so background tasks get to run
    window.set_target_fps(0);

    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    log_info!("Starting display loop...");
    while window.is_open() && !window.is_key_down(Key::Escape) {
        ticker.tick().await;

        if window.is_key_pressed(Key::S, KeyRepeat::No) {
            session.toggle().await;
        }

        let native = session.native_size().unwrap_or(Vec2::new(0, 0));
        if detections.has_changed().unwrap_or(false) || native != last_native {
            let set = detections.borrow_and_update().clone();
            renderer.render(&set, native);
            last_native = native;
        }

        let mut buffer = picture(&session);
        composite(renderer.canvas(), &mut buffer);
        buffer.extend_from_slice(status_bar(&session, font).pixels());
        window.update_with_buffer(&buffer, DISPLAY_SIZE.x, DISPLAY_SIZE.y + STATUS_HEIGHT)?;
    }

    log_info!("Exiting...");
    session.stop();
    session.wait_released().await;
    Ok(())
}
