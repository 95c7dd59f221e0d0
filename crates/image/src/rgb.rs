use {crate::*, base::Vec2};

pub fn yuyv_to_rgb(size: Vec2<usize>, data: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(size.area() * 3);
    for chunk in data.chunks_exact(4) {
        let (r0, g0, b0) = yuv_to_rgb(chunk[0], chunk[1], chunk[3]);
        let (r1, g1, b1) = yuv_to_rgb(chunk[2], chunk[1], chunk[3]);
        rgb.extend_from_slice(&[r0, g0, b0, r1, g1, b1]);
    }
    rgb
}

pub fn argb_to_rgb(size: Vec2<usize>, data: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(size.area() * 3);
    for chunk in data.chunks_exact(4) {
        rgb.extend_from_slice(&chunk[1..4]);
    }
    rgb
}

pub fn jpeg_to_rgb(image: &Image) -> Result<Image, ImageError> {
    let decoded = crates_image::load_from_memory(&image.data)
        .map_err(|e| ImageError::Decode(format!("failed to decode JPEG: {}", e)))?;
    let rgb_image = decoded.to_rgb8();
    let (width, height) = rgb_image.dimensions();
    Ok(Image::new(
        Vec2::new(width as usize, height as usize),
        rgb_image.into_raw(),
        PixelFormat::Rgb8,
    ))
}

/// Rasterize any supported frame into a tightly packed RGB image at its
/// native resolution.
pub fn to_rgb(image: &Image) -> Result<Image, ImageError> {
    image.validate()?;
    match image.format {
        PixelFormat::Rgb8 => Ok(image.clone()),
        PixelFormat::Argb8 => Ok(Image::new(
            image.size,
            argb_to_rgb(image.size, &image.data),
            PixelFormat::Rgb8,
        )),
        PixelFormat::Yuyv => Ok(Image::new(
            image.size,
            yuyv_to_rgb(image.size, &image.data),
            PixelFormat::Rgb8,
        )),
        PixelFormat::Jpeg => jpeg_to_rgb(image),
    }
}
