use {crate::*, base::Vec2};

/// A frame buffer in a known pixel format.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub size: Vec2<usize>,
    pub data: Vec<u8>,
    pub format: PixelFormat,
}

impl Image {
    pub fn new(size: Vec2<usize>, data: Vec<u8>, format: PixelFormat) -> Self {
        Self { size, data, format }
    }

    /// Check that the buffer holds exactly one frame of `size`.
    ///
    /// JPEG data is compressed, so only non-emptiness is checked for it.
    pub fn validate(&self) -> Result<(), ImageError> {
        match self.format.frame_len(self.size) {
            Some(expected) if expected != self.data.len() => Err(ImageError::Size {
                expected,
                actual: self.data.len(),
            }),
            None if self.data.is_empty() => Err(ImageError::Decode("empty JPEG buffer".to_string())),
            _ => Ok(()),
        }
    }
}
