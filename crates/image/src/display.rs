use {crate::*, base::Vec2};

pub fn pack_u32(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

pub fn rgb_to_u32(size: Vec2<usize>, data: &[u8]) -> Vec<u32> {
    let mut buf = Vec::with_capacity(size.area());
    for chunk in data.chunks_exact(3) {
        buf.push(pack_u32(chunk[0], chunk[1], chunk[2]));
    }
    buf
}

pub fn argb_to_u32(size: Vec2<usize>, data: &[u8]) -> Vec<u32> {
    let mut buf = Vec::with_capacity(size.area());
    for chunk in data.chunks_exact(4) {
        buf.push(
            (chunk[0] as u32) << 24
                | (chunk[1] as u32) << 16
                | (chunk[2] as u32) << 8
                | chunk[3] as u32,
        );
    }
    buf
}

pub fn yuyv_to_u32(size: Vec2<usize>, data: &[u8]) -> Vec<u32> {
    let mut buf = Vec::with_capacity(size.area());
    for chunk in data.chunks_exact(4) {
        let (r0, g0, b0) = yuv_to_rgb(chunk[0], chunk[1], chunk[3]);
        let (r1, g1, b1) = yuv_to_rgb(chunk[2], chunk[1], chunk[3]);
        buf.push(pack_u32(r0, g0, b0));
        buf.push(pack_u32(r1, g1, b1));
    }
    buf
}

/// Convert a frame into packed `0xAARRGGBB` pixels for a window buffer.
pub fn image_to_u32(image: &Image) -> Result<Vec<u32>, ImageError> {
    image.validate()?;
    match image.format {
        PixelFormat::Rgb8 => Ok(rgb_to_u32(image.size, &image.data)),
        PixelFormat::Argb8 => Ok(argb_to_u32(image.size, &image.data)),
        PixelFormat::Yuyv => Ok(yuyv_to_u32(image.size, &image.data)),
        PixelFormat::Jpeg => {
            let rgb = jpeg_to_rgb(image)?;
            Ok(rgb_to_u32(rgb.size, &rgb.data))
        }
    }
}

/// Nearest-neighbour resample of a packed pixel buffer.
pub fn scale_u32(src: &[u32], src_size: Vec2<usize>, dst_size: Vec2<usize>) -> Vec<u32> {
    if src_size == dst_size {
        return src.to_vec();
    }
    let mut dst = vec![0u32; dst_size.area()];
    if src_size.is_empty() || src.len() < src_size.area() {
        return dst;
    }
    for y in 0..dst_size.y {
        let sy = y * src_size.y / dst_size.y;
        let src_row = &src[sy * src_size.x..(sy + 1) * src_size.x];
        let dst_row = &mut dst[y * dst_size.x..(y + 1) * dst_size.x];
        for (x, pixel) in dst_row.iter_mut().enumerate() {
            *pixel = src_row[x * src_size.x / dst_size.x];
        }
    }
    dst
}
