use {
    crate::{font::Font, *},
    base::*,
};

pub const TRANSPARENT: u32 = 0x0000_0000;
pub const BOX_COLOR: u32 = 0xFF00_FF00;
pub const LABEL_BACKGROUND: u32 = 0xFF00_FF00;
pub const LABEL_TEXT: u32 = 0xFF00_0000;
pub const BOX_THICKNESS: i32 = 2;
pub const LABEL_PADDING: usize = 3;

/// An ARGB pixel buffer; alpha 0 means "show what's underneath".
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    size: Vec2<usize>,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(size: Vec2<usize>) -> Self {
        Self {
            size,
            pixels: vec![TRANSPARENT; size.area()],
        }
    }

    pub fn size(&self) -> Vec2<usize> {
        self.size
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.size.x && y < self.size.y {
            Some(self.pixels[y * self.size.x + x])
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(TRANSPARENT);
    }

    /// Fill a `width` x `height` block at (`x`, `y`), clipped to the canvas.
    pub fn fill(&mut self, x: i32, y: i32, width: i32, height: i32, color: u32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(width).min(self.size.x as i32);
        let y1 = y.saturating_add(height).min(self.size.y as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for row in y0..y1 {
            let start = row as usize * self.size.x;
            self.pixels[start + x0 as usize..start + x1 as usize].fill(color);
        }
    }

    pub fn fill_rect(&mut self, rect: Rect<i32>, color: u32) {
        self.fill(rect.origin.x, rect.origin.y, rect.size.x, rect.size.y, color);
    }

    /// Outline drawn on the inside of `rect`.
    pub fn stroke_rect(&mut self, rect: Rect<i32>, thickness: i32, color: u32) {
        let Rect { origin, size } = rect;
        if size.x <= 0 || size.y <= 0 {
            return;
        }
        let t = thickness.min(size.x).min(size.y);
        let bottom = origin.y.saturating_add(size.y).saturating_sub(t);
        let right = origin.x.saturating_add(size.x).saturating_sub(t);
        self.fill(origin.x, origin.y, size.x, t, color);
        self.fill(origin.x, bottom, size.x, t, color);
        self.fill(origin.x, origin.y, t, size.y, color);
        self.fill(right, origin.y, t, size.y, color);
    }
}

/// Per-axis `displayed / native`. An axis with no native extent keeps 1.0.
pub fn scale_factors(native: Vec2<usize>, display: Vec2<usize>) -> Vec2<f32> {
    let axis = |native: usize, display: usize| {
        if native == 0 {
            1.0
        } else {
            display as f32 / native as f32
        }
    };
    Vec2::new(axis(native.x, display.x), axis(native.y, display.y))
}

/// Map a box from frame coordinates to display coordinates.
pub fn scale_box(bbox: &BoundingBox, factors: Vec2<f32>) -> Rect<f32> {
    bbox.to_rect().scale(factors)
}

/// Draws a detection set into a transparent canvas the size of the display.
pub struct OverlayRenderer {
    canvas: Canvas,
    font: Font,
}

impl OverlayRenderer {
    pub fn new(display_size: Vec2<usize>) -> Self {
        Self {
            canvas: Canvas::new(display_size),
            font: Font::default(),
        }
    }

    pub fn with_font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    pub fn display_size(&self) -> Vec2<usize> {
        self.canvas.size()
    }

    /// Resize the canvas; the next `render` fills it again.
    pub fn resize(&mut self, display_size: Vec2<usize>) {
        if display_size != self.canvas.size() {
            self.canvas = Canvas::new(display_size);
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Redraw everything from scratch. `native_size` is the resolution of the
    /// frames the detections refer to; nothing is drawn while it is unknown.
    pub fn render(&mut self, set: &DetectionSet, native_size: Vec2<usize>) {
        self.canvas.clear();
        if native_size.is_empty() {
            return;
        }
        let factors = scale_factors(native_size, self.canvas.size());
        for detection in &set.detections {
            let rect = scale_box(&detection.bbox, factors).to_pixels();
            if rect.size.x <= 0 || rect.size.y <= 0 {
                continue;
            }
            self.canvas.stroke_rect(rect, BOX_THICKNESS, BOX_COLOR);
            self.draw_label(rect.origin, &detection.label());
        }
    }

    // background sits directly on top of the box's upper edge
    fn draw_label(&mut self, anchor: Vec2<i32>, text: &str) {
        let text_size = self.font.measure(text);
        let padding = LABEL_PADDING as i32;
        let width = text_size.x as i32 + 2 * padding;
        let height = text_size.y as i32 + 2 * padding;
        let origin = Vec2::new(anchor.x, anchor.y.saturating_sub(height));
        self.canvas.fill(origin.x, origin.y, width, height, LABEL_BACKGROUND);
        self.font.draw(
            &mut self.canvas,
            Vec2::new(
                origin.x.saturating_add(padding),
                origin.y.saturating_add(padding),
            ),
            text,
            LABEL_TEXT,
        );
    }
}

/// Copy every non-transparent canvas pixel onto `frame` (same size as the
/// canvas, packed `0xAARRGGBB`).
pub fn composite(canvas: &Canvas, frame: &mut [u32]) {
    for (dst, &src) in frame.iter_mut().zip(canvas.pixels()) {
        if src >> 24 != 0 {
            *dst = src;
        }
    }
}
