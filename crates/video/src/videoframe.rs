use image::Image;

#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub image: Image,
    pub captured_at_ms: u64,
}
