//! Image feature extraction.
//!
//! Turns a preprocessed image tensor into the fixed-length embedding the
//! caption model is conditioned on, using an InceptionV3 network running
//! locally via ONNX Runtime.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen_core::encoder::{preprocess::preprocess, FeatureExtractor, InceptionEncoder};
//! use lumen_core::Config;
//!
//! let config = Config::default();
//! let encoder = InceptionEncoder::load(&config.encoder_path(), &config.encoder)?;
//! let tensor = preprocess(&decoded_image, config.encoder.image_size);
//! let embedding = encoder.extract(&tensor)?;
//! // embedding.dim() == 2048
//! ```

mod inception;
pub mod preprocess;

use std::path::Path;
use std::sync::Arc;

use ndarray::Array4;

use crate::config::EncoderConfig;
use crate::error::{PipelineError, PipelineResult};

use self::inception::InceptionSession;

/// A fixed-length image feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEmbedding(Vec<f32>);

impl ImageEmbedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Number of feature dimensions.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

/// Produces an image embedding from a preprocessed `[1, H, W, 3]` tensor.
///
/// Implementations are blocking and shareable across threads.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, tensor: &Array4<f32>) -> PipelineResult<ImageEmbedding>;
}

impl<T: FeatureExtractor + ?Sized> FeatureExtractor for Arc<T> {
    fn extract(&self, tensor: &Array4<f32>) -> PipelineResult<ImageEmbedding> {
        (**self).extract(tensor)
    }
}

/// InceptionV3 feature extractor backed by ONNX Runtime.
pub struct InceptionEncoder {
    session: InceptionSession,
    feature_dim: usize,
}

impl InceptionEncoder {
    /// Load the feature extractor from an ONNX file.
    pub fn load(model_path: &Path, config: &EncoderConfig) -> PipelineResult<Self> {
        if !model_path.exists() {
            return Err(PipelineError::Model {
                path: model_path.to_path_buf(),
                message: "Model not found. Run `lumen models list` to see expected files."
                    .to_string(),
            });
        }

        tracing::info!("Loading feature extractor from {:?}", model_path);
        let session = InceptionSession::load(model_path)?;
        tracing::info!("Feature extractor loaded successfully");

        Ok(Self {
            session,
            feature_dim: config.feature_dim,
        })
    }

    /// Expected embedding length.
    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }
}

impl FeatureExtractor for InceptionEncoder {
    fn extract(&self, tensor: &Array4<f32>) -> PipelineResult<ImageEmbedding> {
        let features = self.session.run(tensor)?;
        if features.len() != self.feature_dim {
            return Err(PipelineError::encoder(format!(
                "expected {} features, model returned {}",
                self.feature_dim,
                features.len()
            )));
        }
        Ok(ImageEmbedding::new(features))
    }
}
