//! Image decoding with content-based format detection.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};

use crate::error::PipelineError;

/// Decodes image bytes and enforces a dimension limit.
pub struct ImageDecoder {
    max_image_dimension: u32,
}

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    pub fn new(max_image_dimension: u32) -> Self {
        Self {
            max_image_dimension,
        }
    }

    /// Decode an image from an in-memory byte buffer.
    ///
    /// The format is guessed from the content, never from a file name.
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, PipelineError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                message: format!("Cannot detect image format: {e}"),
            })?;
        let format = reader.format().ok_or_else(|| PipelineError::Decode {
            message: "Unrecognized image format".to_string(),
        })?;
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        if width > self.max_image_dimension || height > self.max_image_dimension {
            return Err(PipelineError::ImageTooLarge {
                width,
                height,
                max_dim: self.max_image_dimension,
            });
        }

        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        ImageFormat::Pnm => "pnm".to_string(),
        ImageFormat::Qoi => "qoi".to_string(),
        _ => "unknown".to_string(),
    }
}
