use std::fmt;

#[derive(Debug)]
pub enum VideoError {
    PermissionDenied(String),
    NoDevice(String),
    Device(String),
    Stream(String),
    Image(image::ImageError),
}

impl VideoError {
    /// Permission and availability problems, as opposed to stream hiccups.
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            VideoError::PermissionDenied(_) | VideoError::NoDevice(_) | VideoError::Device(_)
        )
    }
}

impl fmt::Display for VideoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoError::PermissionDenied(msg) => write!(f, "camera permission denied: {msg}"),
            VideoError::NoDevice(msg) => write!(f, "no camera available: {msg}"),
            VideoError::Device(msg) => write!(f, "device error: {msg}"),
            VideoError::Stream(msg) => write!(f, "stream error: {msg}"),
            VideoError::Image(err) => write!(f, "image error: {err}"),
        }
    }
}

impl std::error::Error for VideoError {}

impl From<std::io::Error> for VideoError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => VideoError::PermissionDenied(err.to_string()),
            std::io::ErrorKind::NotFound => VideoError::NoDevice(err.to_string()),
            _ => VideoError::Device(err.to_string()),
        }
    }
}

impl From<image::ImageError> for VideoError {
    fn from(err: image::ImageError) -> Self {
        VideoError::Image(err)
    }
}
