//! Sub-configuration structs with their defaults.

use crate::decoder::{DecodeOptions, ScoreMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where models and the vocabulary are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.lumen/models"),
        }
    }
}

/// Feature extractor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// ONNX file name inside the model directory
    pub model_file: String,

    /// Square input size the extractor was trained on
    pub image_size: u32,

    /// Length of the feature vector the extractor emits
    pub feature_dim: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_file: "inception_v3.onnx".to_string(),
            image_size: 299,
            feature_dim: 2048,
        }
    }
}

/// Element type of the caption model's sequence input.
///
/// Keras `Input` layers default to float32, so exported models usually take
/// token indices as floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceDtype {
    #[default]
    Float32,
    Int64,
}

/// Caption model and beam search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// ONNX file name inside the model directory
    pub model_file: String,

    /// Candidates kept after each step (K)
    pub beam_width: usize,

    /// Decoding steps and model input width (L)
    pub max_length: usize,

    /// How per-token probabilities accumulate into a candidate score
    pub score_mode: ScoreMode,

    /// Fill value appended after the tokens of a partial sequence
    pub pad_value: u32,

    /// Name of the image feature input tensor
    pub features_input: String,

    /// Name of the token sequence input tensor
    pub sequence_input: String,

    /// Element type of the token sequence input
    pub sequence_dtype: SequenceDtype,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        let options = DecodeOptions::default();
        Self {
            model_file: "caption_model.onnx".to_string(),
            beam_width: options.beam_width,
            max_length: options.max_length,
            score_mode: options.score_mode,
            pad_value: options.pad_value,
            features_input: "Features_Input".to_string(),
            sequence_input: "Sequence_Input".to_string(),
            sequence_dtype: SequenceDtype::default(),
        }
    }
}

impl DecoderConfig {
    /// The beam search options described by this section.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            beam_width: self.beam_width,
            max_length: self.max_length,
            score_mode: self.score_mode,
            pad_value: self.pad_value,
        }
    }
}

/// Vocabulary file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Vocabulary file inside the model directory (`.json` map or one token per line)
    pub file: String,

    /// Token that opens every sequence
    pub start_token: String,

    /// Token that terminates a caption
    pub end_token: String,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            file: "vocabulary.json".to_string(),
            start_token: "start".to_string(),
            end_token: "end".to_string(),
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum image payload in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Time budget for one caption, enforced by the caller
    pub caption_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            max_image_dimension: 10000,
            caption_timeout_ms: 60000,
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// File extensions picked up when captioning a directory
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: ["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,

    /// Upper-case the first letter of each caption
    pub capitalize: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
            capitalize: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
