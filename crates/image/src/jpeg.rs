use {crate::*, base::Vec2, crates_image::ImageEncoder};

pub fn rgb_to_jpeg(size: Vec2<usize>, data: &[u8], quality: u8) -> Result<Vec<u8>, ImageError> {
    let expected = size.area() * 3;
    if data.len() != expected {
        return Err(ImageError::Size {
            expected,
            actual: data.len(),
        });
    }
    let mut buffer = Vec::new();
    let encoder = crates_image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(
            data,
            size.x as u32,
            size.y as u32,
            crates_image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// Encode any supported frame as JPEG.
///
/// Frames that are already JPEG (MJPG cameras) are re-encoded as well so the
/// requested quality always applies.
pub fn image_to_jpeg(image: &Image, quality: u8) -> Result<Vec<u8>, ImageError> {
    let rgb = to_rgb(image)?;
    rgb_to_jpeg(rgb.size, &rgb.data, quality)
}

/// Encode on tokio's blocking pool.
pub async fn encode_jpeg(image: Image, quality: u8) -> Result<Vec<u8>, ImageError> {
    tokio::task::spawn_blocking(move || image_to_jpeg(&image, quality))
        .await
        .map_err(|e| ImageError::Encode(e.to_string()))?
}
