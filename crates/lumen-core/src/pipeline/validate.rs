//! Payload validation before decoding.

use crate::config::LimitsConfig;
use crate::error::PipelineError;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Cheap checks on raw image bytes, run before the decoder sees them.
pub struct Validator {
    max_file_size_mb: u64,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            max_file_size_mb: limits.max_file_size_mb,
        }
    }

    /// Checks:
    /// - payload is non-empty
    /// - payload size is within limits
    /// - payload starts with the magic bytes of a decodable format
    pub fn validate(&self, bytes: &[u8]) -> Result<(), PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::Decode {
                message: "Empty image payload".to_string(),
            });
        }

        let size = bytes.len() as u64;
        if size > self.max_file_size_mb * BYTES_PER_MB {
            return Err(PipelineError::FileTooLarge {
                size_mb: size / BYTES_PER_MB,
                max_mb: self.max_file_size_mb,
            });
        }

        if bytes.len() < 4 {
            return Err(PipelineError::Decode {
                message: "Payload too small to be a valid image".to_string(),
            });
        }

        if !has_image_signature(bytes) {
            return Err(PipelineError::Decode {
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }
}

/// Whether the header matches a format the image decoder can read.
fn has_image_signature(header: &[u8]) -> bool {
    image::guess_format(header).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::new(&LimitsConfig::default())
    }

    #[test]
    fn test_magic_bytes_jpeg() {
        assert!(has_image_signature(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]));
    }

    #[test]
    fn test_magic_bytes_png() {
        assert!(has_image_signature(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]));
    }

    #[test]
    fn test_magic_bytes_webp() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'E', b'B', b'P'];
        assert!(has_image_signature(&header));
    }

    #[test]
    fn test_magic_bytes_riff_without_webp_rejected() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'A', b'V', b'E'];
        assert!(!has_image_signature(&header));
    }

    #[test]
    fn test_magic_bytes_tiff() {
        assert!(has_image_signature(&[b'I', b'I', 0x2A, 0x00]));
        assert!(has_image_signature(&[b'M', b'M', 0x00, 0x2A]));
        assert!(!has_image_signature(&[b'I', b'I', 0x00, 0x00]));
    }

    #[test]
    fn test_magic_bytes_pnm_and_qoi() {
        assert!(has_image_signature(b"P6\n16 16\n255\n"));
        assert!(has_image_signature(b"P5\n16 16\n255\n"));
        assert!(has_image_signature(b"qoif\0\0\0\x10\0\0\0\x10\x03\x00"));
    }

    #[test]
    fn test_magic_bytes_invalid() {
        assert!(!has_image_signature(b"not an image at all"));
    }

    #[test]
    fn test_validate_empty_payload() {
        let err = validator().validate(&[]).unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_validate_short_payload() {
        let err = validator().validate(&[0xFF, 0xD8]).unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[test]
    fn test_validate_text_payload() {
        let err = validator().validate(b"hello world").unwrap_err();
        assert!(err.to_string().contains("magic bytes"));
    }

    #[test]
    fn test_validate_oversized_payload() {
        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let mut bytes = vec![0u8; 2 * 1024 * 1024];
        bytes[..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);

        let err = Validator::new(&limits).validate(&bytes).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::FileTooLarge { size_mb: 2, max_mb: 1 }
        ));
    }

    #[test]
    fn test_validate_accepts_png_header() {
        let header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(validator().validate(&header).is_ok());
    }
}
