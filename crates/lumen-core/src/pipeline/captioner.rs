//! The captioning entry point: bytes in, caption out.
//!
//! ```text
//! bytes → Validate → Decode → Preprocess → Extract (InceptionV3) → Beam search → caption
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::decoder::{BeamSearchDecoder, Caption, CaptionModel, OnnxCaptionModel, Vocabulary};
use crate::encoder::{FeatureExtractor, InceptionEncoder};
use crate::error::{PipelineError, PipelineResult, Result};
use crate::types::{capitalize, CaptionRecord};

use super::decode::format_to_string;
use super::hash::content_hash;
use super::preprocessor::Preprocessor;

/// Composes preprocessing, feature extraction, and beam search decoding.
///
/// Holds only read-only state after construction, so one instance can be
/// shared across worker threads behind an `Arc`.
pub struct Captioner {
    preprocessor: Preprocessor,
    extractor: Box<dyn FeatureExtractor>,
    decoder: BeamSearchDecoder,
    feature_dim: usize,
    capitalize: bool,
}

impl Captioner {
    /// Load the vocabulary and both ONNX models named by the configuration.
    ///
    /// All configuration problems (bad options, vocabulary without start or
    /// end token, missing model files) surface here, before any request.
    pub fn load(config: &Config) -> Result<Self> {
        let vocabulary = Arc::new(Vocabulary::load(
            &config.vocabulary_path(),
            &config.vocabulary,
        )?);
        let extractor = InceptionEncoder::load(&config.encoder_path(), &config.encoder)?;
        let model = OnnxCaptionModel::load(
            &config.decoder_path(),
            &config.decoder,
            config.encoder.feature_dim,
        )?;

        Self::new(config, Box::new(extractor), Box::new(model), vocabulary)
    }

    /// Assemble a captioner from already-constructed collaborators.
    pub fn new(
        config: &Config,
        extractor: Box<dyn FeatureExtractor>,
        model: Box<dyn CaptionModel>,
        vocabulary: Arc<Vocabulary>,
    ) -> Result<Self> {
        let decoder = BeamSearchDecoder::new(model, vocabulary, config.decoder.decode_options())?;
        tracing::debug!(
            "Captioner ready (beam_width={}, max_length={}, score_mode={:?})",
            decoder.options().beam_width,
            decoder.options().max_length,
            decoder.options().score_mode,
        );

        Ok(Self {
            preprocessor: Preprocessor::new(config),
            extractor,
            decoder,
            feature_dim: config.encoder.feature_dim,
            capitalize: config.output.capitalize,
        })
    }

    /// Caption raw image bytes. An empty string is a valid caption.
    pub fn generate_caption(&self, bytes: &[u8]) -> PipelineResult<String> {
        self.caption(bytes).map(|c| c.text)
    }

    /// Caption raw image bytes, keeping the winning tokens and score.
    pub fn caption(&self, bytes: &[u8]) -> PipelineResult<Caption> {
        let prepared = self.preprocessor.prepare(bytes)?;
        self.caption_tensor(&prepared.tensor)
    }

    /// Caption a file's contents and build its output record.
    ///
    /// `path` only labels the record; the bytes are what gets captioned.
    pub fn process(&self, path: &Path, bytes: &[u8]) -> PipelineResult<CaptionRecord> {
        let start = Instant::now();
        tracing::debug!("Captioning: {:?}", path);

        let prepared = self.preprocessor.prepare(bytes)?;
        let caption = self.caption_tensor(&prepared.tensor)?;
        let text = if self.capitalize {
            capitalize(&caption.text)
        } else {
            caption.text
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        let latency = start.elapsed();
        tracing::debug!("Captioned {:?} in {:?}: {:?}", file_name, latency, text);

        Ok(CaptionRecord {
            file_path: path.to_path_buf(),
            file_name,
            content_hash: content_hash(bytes),
            width: prepared.width,
            height: prepared.height,
            format: format_to_string(prepared.format),
            caption: text,
            score: caption.score,
            latency_ms: latency.as_millis() as u64,
        })
    }

    pub fn decoder(&self) -> &BeamSearchDecoder {
        &self.decoder
    }

    fn caption_tensor(&self, tensor: &ndarray::Array4<f32>) -> PipelineResult<Caption> {
        let embedding = self.extractor.extract(tensor)?;
        if embedding.dim() != self.feature_dim {
            return Err(PipelineError::encoder(format!(
                "expected {} features, extractor returned {}",
                self.feature_dim,
                embedding.dim()
            )));
        }
        self.decoder.decode(&embedding)
    }
}
