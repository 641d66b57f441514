//! Configuration management for Lumen.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Lumen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Feature extractor settings
    pub encoder: EncoderConfig,

    /// Caption model and beam search settings
    pub decoder: DecoderConfig,

    /// Vocabulary settings
    pub vocabulary: VocabularyConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Directory processing settings
    pub processing: ProcessingConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.lumen.lumen/config.toml
    /// - Linux: ~/.config/lumen/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\lumen\config\config.toml
    ///
    /// Falls back to ~/.lumen/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "lumen", "lumen")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".lumen").join("config.toml")
            })
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        let path_str = self.general.model_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Path of the feature extractor ONNX file.
    pub fn encoder_path(&self) -> PathBuf {
        self.model_dir().join(&self.encoder.model_file)
    }

    /// Path of the caption model ONNX file.
    pub fn decoder_path(&self) -> PathBuf {
        self.model_dir().join(&self.decoder.model_file)
    }

    /// Path of the vocabulary file.
    pub fn vocabulary_path(&self) -> PathBuf {
        self.model_dir().join(&self.vocabulary.file)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::ScoreMode;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.decoder.beam_width, 3);
        assert_eq!(config.decoder.max_length, 25);
        assert_eq!(config.decoder.score_mode, ScoreMode::LogProbability);
        assert_eq!(config.encoder.image_size, 299);
        assert_eq!(config.encoder.feature_dim, 2048);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[decoder]"));
        assert!(toml.contains("score_mode = \"log-probability\""));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            "[decoder]\nbeam_width = 5\nscore_mode = \"probability\"\n",
        )
        .unwrap();
        assert_eq!(config.decoder.beam_width, 5);
        assert_eq!(config.decoder.score_mode, ScoreMode::Probability);
        assert_eq!(config.decoder.max_length, 25);
        assert_eq!(config.vocabulary.start_token, "start");
    }

    #[test]
    fn test_from_toml_validates() {
        let err = Config::from_toml("[decoder]\nbeam_width = 0\n").unwrap_err();
        assert!(err.to_string().contains("beam_width"));
    }

    #[test]
    fn test_model_paths_join_model_dir() {
        let mut config = Config::default();
        config.general.model_dir = PathBuf::from("/opt/lumen");
        assert_eq!(
            config.decoder_path(),
            PathBuf::from("/opt/lumen/caption_model.onnx")
        );
        assert_eq!(
            config.vocabulary_path(),
            PathBuf::from("/opt/lumen/vocabulary.json")
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[output]\ncapitalize = false\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert!(!config.output.capitalize);
    }
}
