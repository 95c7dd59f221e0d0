use base::Vec2;
use image::{Image, ImageError, PixelFormat};

fn gradient(size: Vec2<usize>) -> Vec<u8> {
    (0..size.area() * 3).map(|v| (v % 251) as u8).collect()
}

#[test]
fn test_rgb_to_jpeg_has_soi_marker() {
    let size = Vec2::new(4, 4);
    let jpeg = image::rgb_to_jpeg(size, &gradient(size), 90).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_rgb_to_jpeg_quality_affects_size() {
    let size = Vec2::new(32, 32);
    let data = gradient(size);
    let low = image::rgb_to_jpeg(size, &data, 10).unwrap();
    let high = image::rgb_to_jpeg(size, &data, 100).unwrap();
    assert!(low.len() < high.len());
}

#[test]
fn test_rgb_to_jpeg_rejects_short_buffer() {
    let result = image::rgb_to_jpeg(Vec2::new(4, 4), &[0u8; 10], 80);
    assert!(matches!(
        result,
        Err(ImageError::Size {
            expected: 48,
            actual: 10
        })
    ));
}

#[test]
fn test_yuyv_frame_encodes_at_native_size() {
    let size = Vec2::new(8, 6);
    let frame = Image::new(size, vec![128u8; size.area() * 2], PixelFormat::Yuyv);
    let jpeg = image::image_to_jpeg(&frame, 80).unwrap();

    let decoded = image::jpeg_to_rgb(&Image::new(size, jpeg, PixelFormat::Jpeg)).unwrap();
    assert_eq!(decoded.size, size);
    assert_eq!(decoded.data.len(), size.area() * 3);
}

#[test]
fn test_jpeg_to_rgb_rejects_invalid_data() {
    let invalid = Image::new(Vec2::new(4, 4), vec![0u8; 10], PixelFormat::Jpeg);
    assert!(image::jpeg_to_rgb(&invalid).is_err());
}

#[test]
fn test_to_rgb_validates_buffer_length() {
    let frame = Image::new(Vec2::new(4, 4), vec![0u8; 7], PixelFormat::Argb8);
    assert!(image::to_rgb(&frame).is_err());
}

#[test]
fn test_argb_to_rgb_drops_alpha() {
    let size = Vec2::new(2, 1);
    let rgb = image::argb_to_rgb(size, &[0xFF, 1, 2, 3, 0x80, 4, 5, 6]);
    assert_eq!(rgb, vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn test_encode_jpeg_on_blocking_pool() {
    let size = Vec2::new(16, 8);
    let frame = Image::new(size, gradient(size), PixelFormat::Rgb8);
    let jpeg = image::encode_jpeg(frame, 80).await.unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
}
