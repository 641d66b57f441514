//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.decoder.decode_options().validate()?;
        if self.encoder.image_size == 0 {
            return Err(ConfigError::ValidationError(
                "encoder.image_size must be > 0".into(),
            ));
        }
        if self.encoder.feature_dim == 0 {
            return Err(ConfigError::ValidationError(
                "encoder.feature_dim must be > 0".into(),
            ));
        }
        if self.vocabulary.start_token.is_empty() || self.vocabulary.end_token.is_empty() {
            return Err(ConfigError::ValidationError(
                "vocabulary.start_token and vocabulary.end_token must be set".into(),
            ));
        }
        if self.vocabulary.start_token == self.vocabulary.end_token {
            return Err(ConfigError::ValidationError(
                "vocabulary.start_token and vocabulary.end_token must differ".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.caption_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.caption_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}
