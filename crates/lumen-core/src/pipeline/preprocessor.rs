//! Raw bytes to extractor-ready tensor.

use image::ImageFormat;
use ndarray::Array4;

use crate::config::Config;
use crate::encoder::preprocess::preprocess;
use crate::error::PipelineResult;

use super::decode::ImageDecoder;
use super::validate::Validator;

/// An image ready for the feature extractor, plus what was learned decoding it.
#[derive(Debug)]
pub struct PreparedImage {
    /// `[1, H, W, 3]` normalized tensor
    pub tensor: Array4<f32>,
    /// Original width in pixels
    pub width: u32,
    /// Original height in pixels
    pub height: u32,
    /// Detected image format
    pub format: ImageFormat,
}

/// Validate, decode, and normalize image bytes.
pub struct Preprocessor {
    validator: Validator,
    decoder: ImageDecoder,
    image_size: u32,
}

impl Preprocessor {
    pub fn new(config: &Config) -> Self {
        Self {
            validator: Validator::new(&config.limits),
            decoder: ImageDecoder::new(config.limits.max_image_dimension),
            image_size: config.encoder.image_size,
        }
    }

    /// Fails with a client-side error for anything that is not a decodable image.
    pub fn prepare(&self, bytes: &[u8]) -> PipelineResult<PreparedImage> {
        self.validator.validate(bytes)?;
        let decoded = self.decoder.decode(bytes)?;
        let tensor = preprocess(&decoded.image, self.image_size);

        Ok(PreparedImage {
            tensor,
            width: decoded.width,
            height: decoded.height,
            format: decoded.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use image::{DynamicImage, RgbImage, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn test_prepare_png() {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::new(40, 30))
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();

        let mut config = Config::default();
        config.encoder.image_size = 16;
        let prepared = Preprocessor::new(&config)
            .prepare(buffer.get_ref())
            .unwrap();

        assert_eq!(prepared.tensor.shape(), &[1, 16, 16, 3]);
        assert_eq!((prepared.width, prepared.height), (40, 30));
        assert_eq!(prepared.format, ImageFormat::Png);
    }

    #[test]
    fn test_prepare_pnm() {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(16, 12))
            .write_to(&mut buffer, ImageFormat::Pnm)
            .unwrap();

        let mut config = Config::default();
        config.encoder.image_size = 8;
        let prepared = Preprocessor::new(&config)
            .prepare(buffer.get_ref())
            .unwrap();

        assert_eq!(prepared.tensor.shape(), &[1, 8, 8, 3]);
        assert_eq!((prepared.width, prepared.height), (16, 12));
        assert_eq!(prepared.format, ImageFormat::Pnm);
    }

    #[test]
    fn test_prepare_rejects_non_image() {
        let err = Preprocessor::new(&Config::default())
            .prepare(b"<html>oops</html>")
            .unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }
}
