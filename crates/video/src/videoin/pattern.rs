use {
    crate::*,
    base::Vec2,
    image::{Image, PixelFormat},
    std::time::{Duration, Instant},
};

const SQUARE: usize = 48;

/// Synthetic RGB source: a drifting gradient with a white square sweeping
/// across it. Paced to the requested frame rate.
pub(crate) struct Pattern {
    size: Vec2<usize>,
    period: Duration,
    index: u64,
    next_due: Option<Instant>,
    open: bool,
}

impl Pattern {
    pub fn new() -> Self {
        Self {
            size: Vec2::zero(),
            period: Duration::from_secs(1),
            index: 0,
            next_due: None,
            open: false,
        }
    }

    fn render(&self) -> Vec<u8> {
        let (width, height) = (self.size.x, self.size.y);
        let shift = self.index as usize;
        let square_x = (shift * 4) % width.max(1);
        let square_y = height.saturating_sub(SQUARE) / 2;
        let mut data = Vec::with_capacity(self.size.area() * 3);
        for y in 0..height {
            for x in 0..width {
                let inside = x >= square_x
                    && x < square_x + SQUARE
                    && y >= square_y
                    && y < square_y + SQUARE;
                if inside {
                    data.extend_from_slice(&[255, 255, 255]);
                } else {
                    data.extend_from_slice(&[
                        ((x + shift) % 256) as u8,
                        (y % 256) as u8,
                        ((x + y) / 4 % 256) as u8,
                    ]);
                }
            }
        }
        data
    }
}

impl VideoInDevice for Pattern {
    fn open(&mut self, config: &CaptureConfig) -> Result<Negotiated, VideoError> {
        let size = if config.size().is_empty() {
            DEFAULT_SIZE
        } else {
            config.size()
        };
        let frame_rate = if config.frame_rate() > 0.0 {
            config.frame_rate()
        } else {
            DEFAULT_FRAME_RATE
        };
        self.size = size;
        self.period = Duration::from_secs_f32(1.0 / frame_rate);
        self.next_due = None;
        self.open = true;
        Ok(Negotiated {
            size,
            format: PixelFormat::Rgb8,
            frame_rate,
        })
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn blocking_capture(&mut self) -> Result<Image, VideoError> {
        if !self.open {
            return Err(VideoError::Stream("pattern source is closed".to_string()));
        }
        let now = Instant::now();
        let due = self.next_due.unwrap_or(now);
        if due > now {
            std::thread::sleep(due - now);
        }
        self.next_due = Some(due.max(now) + self.period);
        let image = Image::new(self.size, self.render(), PixelFormat::Rgb8);
        self.index += 1;
        Ok(image)
    }
}
