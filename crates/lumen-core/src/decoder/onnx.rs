//! ONNX-backed caption model.
//!
//! The model takes two inputs, the image embedding `[1, D]` and the padded
//! token sequence `[1, L]`, and returns a softmax distribution `[1, V]` over
//! the vocabulary.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::{DynValue, Value};

use crate::config::{DecoderConfig, SequenceDtype};
use crate::encoder::ImageEmbedding;
use crate::error::{PipelineError, PipelineResult};

use super::{CaptionModel, TokenId};

/// Caption model running locally via ONNX Runtime.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct OnnxCaptionModel {
    session: Mutex<Session>,
    features_input: String,
    sequence_input: String,
    sequence_dtype: SequenceDtype,
    feature_dim: usize,
}

impl OnnxCaptionModel {
    /// Load the caption model from an ONNX file.
    ///
    /// `feature_dim` is the embedding length the model was trained on.
    pub fn load(model_path: &Path, config: &DecoderConfig, feature_dim: usize) -> PipelineResult<Self> {
        let model_error = |message: String| PipelineError::Model {
            path: model_path.to_path_buf(),
            message,
        };

        if !model_path.exists() {
            return Err(model_error(
                "Model not found. Run `lumen models list` to see expected files.".to_string(),
            ));
        }

        tracing::info!("Loading caption model from {:?}", model_path);
        let session = Session::builder()
            .map_err(|e| model_error(format!("Failed to create ONNX session builder: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| model_error(format!("Failed to load ONNX model: {e}")))?;

        let input_names: Vec<&str> = session.inputs().iter().map(|i| i.name()).collect();
        for expected in [&config.features_input, &config.sequence_input] {
            if !input_names.contains(&expected.as_str()) {
                return Err(model_error(format!(
                    "Model has no input named {expected:?} (inputs: {input_names:?})"
                )));
            }
        }
        tracing::debug!("Caption model inputs: {:?}", input_names);

        Ok(Self {
            session: Mutex::new(session),
            features_input: config.features_input.clone(),
            sequence_input: config.sequence_input.clone(),
            sequence_dtype: config.sequence_dtype,
            feature_dim,
        })
    }

    fn sequence_value(&self, sequence: &[TokenId]) -> PipelineResult<DynValue> {
        let shape = vec![1i64, sequence.len() as i64];
        let value = match self.sequence_dtype {
            // Keras models trained on padded float arrays expect float32 here.
            SequenceDtype::Float32 => {
                let data: Vec<f32> = sequence.iter().map(|&t| t as f32).collect();
                Value::from_array((shape, data)).map(|v| v.into_dyn())
            }
            SequenceDtype::Int64 => {
                let data: Vec<i64> = sequence.iter().map(|&t| i64::from(t)).collect();
                Value::from_array((shape, data)).map(|v| v.into_dyn())
            }
        };
        value.map_err(|e| PipelineError::decoder(format!("Failed to create sequence tensor: {e}")))
    }
}

impl CaptionModel for OnnxCaptionModel {
    fn predict(&self, embedding: &ImageEmbedding, sequence: &[TokenId]) -> PipelineResult<Vec<f32>> {
        if embedding.dim() != self.feature_dim {
            return Err(PipelineError::decoder(format!(
                "embedding has {} dimensions, model expects {}",
                embedding.dim(),
                self.feature_dim
            )));
        }

        let features = Value::from_array((
            vec![1i64, embedding.dim() as i64],
            embedding.as_slice().to_vec(),
        ))
        .map_err(|e| PipelineError::decoder(format!("Failed to create features tensor: {e}")))?;
        let tokens = self.sequence_value(sequence)?;

        let inputs = ort::inputs![
            self.features_input.as_str() => features,
            self.sequence_input.as_str() => tokens
        ];

        let mut session = self
            .session
            .lock()
            .map_err(|e| PipelineError::decoder(format!("Session lock poisoned: {e}")))?;

        let outputs = session
            .run(inputs)
            .map_err(|e| PipelineError::decoder(format!("ONNX inference failed: {e}")))?;

        let (_, distribution) = outputs
            .iter()
            .next()
            .ok_or_else(|| PipelineError::decoder("Model produced no outputs"))?;

        let (shape, data) = distribution
            .try_extract_tensor::<f32>()
            .map_err(|e| PipelineError::decoder(format!("Failed to extract distribution: {e}")))?;

        // [1, V] for a single sequence.
        match shape.len() {
            1 | 2 => Ok(data.to_vec()),
            _ => Err(PipelineError::decoder(format!(
                "Unexpected output shape: {:?}",
                shape
            ))),
        }
    }
}
