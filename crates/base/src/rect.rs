use crate::Vec2;

/// Pixel coordinates produced by `to_pixels` stay within this distance of the
/// origin, so sizes and offsets derived from them fit in `i32`.
pub const PIXEL_LIMIT: i32 = 1 << 24;

/// Axis-aligned rectangle stored as origin + size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<T> {
    pub origin: Vec2<T>,
    pub size: Vec2<T>,
}

impl<T> Rect<T> {
    pub fn new(origin: Vec2<T>, size: Vec2<T>) -> Self {
        Self { origin, size }
    }
}

impl<T: std::ops::Add<Output = T> + Copy> Rect<T> {
    pub fn min(&self) -> Vec2<T> {
        self.origin
    }

    pub fn max(&self) -> Vec2<T> {
        self.origin + self.size
    }
}

impl<T: std::ops::Sub<Output = T> + Copy> Rect<T> {
    pub fn from_min_max(min: Vec2<T>, max: Vec2<T>) -> Self {
        Self {
            origin: min,
            size: max - min,
        }
    }
}

impl Rect<f32> {
    /// Scale both corners component-wise.
    pub fn scale(&self, factors: Vec2<f32>) -> Self {
        Self {
            origin: self.origin * factors,
            size: self.size * factors,
        }
    }

    /// Round to whole pixels; the far corner is rounded on its own so adjacent
    /// boxes keep their shared edge. Corners are clamped to `PIXEL_LIMIT`.
    pub fn to_pixels(&self) -> Rect<i32> {
        let max = self.max();
        let min = Vec2::new(to_pixel(self.origin.x), to_pixel(self.origin.y));
        let max = Vec2::new(to_pixel(max.x), to_pixel(max.y));
        Rect::new(
            min,
            Vec2::new(max.x.saturating_sub(min.x), max.y.saturating_sub(min.y)),
        )
    }
}

fn to_pixel(value: f32) -> i32 {
    let limit = PIXEL_LIMIT as f32;
    // NaN casts to 0
    value.round().clamp(-limit, limit) as i32
}
