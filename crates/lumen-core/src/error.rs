//! Error types for the Lumen captioning pipeline.
//!
//! Errors are organized by layer: configuration problems are fatal at startup,
//! pipeline problems are per-request and split into client-input failures
//! (bad image payloads) and server-side failures (model invocation).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Lumen operations.
#[derive(Error, Debug)]
pub enum CaptionError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CaptionError {
    /// Whether the failure was caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        match self {
            CaptionError::Pipeline(e) => e.is_client_error(),
            _ => false,
        }
    }
}

/// Configuration-specific errors. All of these are raised at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The vocabulary lacks a token the decoder cannot run without
    #[error("Vocabulary has no {role} token {token:?}")]
    MissingToken { role: &'static str, token: String },

    /// The vocabulary file could not be read or is malformed
    #[error("Invalid vocabulary {path}: {message}")]
    Vocabulary { path: PathBuf, message: String },
}

/// Per-request pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image bytes could not be decoded
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Payload exceeds size limit
    #[error("Image payload too large ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge { size_mb: u64, max_mb: u64 },

    /// Image dimensions exceed limit
    #[error("Image too large ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Feature extractor or caption model failed, or returned malformed output
    #[error("Inference error in {stage}: {message}")]
    Inference {
        stage: &'static str,
        message: String,
    },

    /// Model file missing or failed to load
    #[error("Model error for {path}: {message}")]
    Model { path: PathBuf, message: String },

    /// Operation abandoned by a time-bounded caller
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },
}

impl PipelineError {
    /// Build an inference error for the feature extractor.
    pub fn encoder(message: impl Into<String>) -> Self {
        Self::Inference {
            stage: "encoder",
            message: message.into(),
        }
    }

    /// Build an inference error for the caption model.
    pub fn decoder(message: impl Into<String>) -> Self {
        Self::Inference {
            stage: "decoder",
            message: message.into(),
        }
    }

    /// Client-input failures map to a 4xx-style response; everything else is server-side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Decode { .. }
                | PipelineError::FileTooLarge { .. }
                | PipelineError::ImageTooLarge { .. }
        )
    }
}

/// Convenience type alias for Lumen results.
pub type Result<T> = std::result::Result<T, CaptionError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
