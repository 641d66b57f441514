//! InceptionV3 ONNX session management and inference.
//!
//! Loads an InceptionV3 network exported to ONNX with its classification head
//! removed, so the first output is the pooled feature vector.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::{PipelineError, PipelineResult};

/// Wraps an ONNX Runtime session for InceptionV3 feature extraction.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct InceptionSession {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
}

impl InceptionSession {
    /// Load the feature extractor from an ONNX file.
    pub fn load(model_path: &Path) -> PipelineResult<Self> {
        let model_error = |message: String| PipelineError::Model {
            path: model_path.to_path_buf(),
            message,
        };

        let session = Session::builder()
            .map_err(|e| model_error(format!("Failed to create ONNX session builder: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| model_error(format!("Failed to load ONNX model: {e}")))?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input_1".to_string());

        tracing::debug!(
            "Loaded feature extractor from {:?} (input: {:?}, outputs: {:?})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }

    /// Run inference on a preprocessed `[1, H, W, 3]` tensor.
    ///
    /// Returns the flattened feature vector of the single batch entry.
    pub fn run(&self, preprocessed: &Array4<f32>) -> PipelineResult<Vec<f32>> {
        let shape: Vec<i64> = preprocessed.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = preprocessed.iter().copied().collect();

        let input_value = Value::from_array((shape, flat_data))
            .map_err(|e| PipelineError::encoder(format!("Failed to create input tensor: {e}")))?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self
            .session
            .lock()
            .map_err(|e| PipelineError::encoder(format!("Session lock poisoned: {e}")))?;

        let outputs = session
            .run(inputs)
            .map_err(|e| PipelineError::encoder(format!("ONNX inference failed: {e}")))?;

        let (_, features) = outputs
            .iter()
            .next()
            .ok_or_else(|| PipelineError::encoder("Model produced no outputs"))?;

        let (shape, data) = features
            .try_extract_tensor::<f32>()
            .map_err(|e| PipelineError::encoder(format!("Failed to extract features: {e}")))?;

        // Pooled output is [1, D]; some exports keep the spatial axes as [1, 1, 1, D].
        match shape.first() {
            Some(&1) | None => Ok(data.to_vec()),
            Some(&batch) => Err(PipelineError::encoder(format!(
                "Expected a single feature vector, got batch of {batch} (shape {:?})",
                shape
            ))),
        }
    }
}
