//! Image preprocessing for the InceptionV3 feature extractor.
//!
//! InceptionV3 expects:
//! - Input size: 299×299 pixels (resized, not cropped; aspect ratio is not kept)
//! - Normalization: pixels scaled to [-1, 1] via (pixel/255 - 0.5) * 2
//! - Channel order: RGB
//! - Tensor layout: NHWC [batch, height, width, channels]

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

/// Number of color channels (RGB).
pub const CHANNELS: usize = 3;

/// Map an 8-bit channel value into [-1, 1].
///
/// Must match the extractor's training-time normalization exactly; a mismatch
/// silently degrades captions.
#[inline]
fn normalize(value: u8) -> f32 {
    (value as f32 / 255.0 - 0.5) * 2.0
}

/// Preprocess an image for feature extraction.
///
/// Converts to RGB (dropping alpha, expanding palette and greyscale), resizes
/// to `image_size × image_size`, normalizes to [-1, 1], and adds a leading
/// batch dimension of 1.
pub fn preprocess(image: &DynamicImage, image_size: u32) -> Array4<f32> {
    let rgb = image.to_rgb8();
    let resized = image::imageops::resize(&rgb, image_size, image_size, FilterType::CatmullRom);

    let size = image_size as usize;
    Array4::from_shape_fn((1, size, size, CHANNELS), |(_, y, x, c)| {
        normalize(resized.get_pixel(x as u32, y as u32)[c])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_preprocess_shape_299() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(640, 480));
        let tensor = preprocess(&img, 299);
        assert_eq!(tensor.shape(), &[1, 299, 299, 3]);
    }

    #[test]
    fn test_preprocess_ignores_aspect_ratio() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(1000, 20));
        let tensor = preprocess(&img, 64);
        assert_eq!(tensor.shape(), &[1, 64, 64, 3]);
    }

    #[test]
    fn test_preprocess_normalization_range() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([255, 255, 255])));
        let tensor = preprocess(&img, 32);
        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < 1e-6));

        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([0, 0, 0])));
        let tensor = preprocess(&img, 32);
        assert!(tensor.iter().all(|&v| (v + 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_preprocess_channel_order_is_last_axis() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 0, 51])));
        let tensor = preprocess(&img, 4);
        assert!((tensor[[0, 2, 3, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 2, 3, 1]] + 1.0).abs() < 1e-6);
        assert!((tensor[[0, 2, 3, 2]] - (51.0 / 255.0 - 0.5) * 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_greyscale_expands_to_three_channels() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([255])));
        let tensor = preprocess(&img, 8);
        assert_eq!(tensor.shape(), &[1, 8, 8, 3]);
        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_preprocess_drops_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0])));
        let tensor = preprocess(&img, 8);
        assert_eq!(tensor.shape(), &[1, 8, 8, 3]);
        assert!(tensor.iter().all(|&v| (v + 1.0).abs() < 1e-6));
    }
}
