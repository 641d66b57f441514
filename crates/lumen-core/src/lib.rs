//! Lumen Core - Embeddable image captioning library.
//!
//! Lumen turns an image into a one-sentence natural-language caption. Visual
//! features come from a pretrained InceptionV3 network, and the caption is
//! decoded from a trained caption model with beam search.
//!
//! # Architecture
//!
//! ```text
//! Image bytes → Validate → Decode → Preprocess → Extract features → Beam search → Caption
//! ```
//!
//! The feature extractor and caption model sit behind the [`FeatureExtractor`]
//! and [`CaptionModel`] traits; ONNX Runtime implementations are provided.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen_core::{Captioner, Config};
//!
//! fn main() -> lumen_core::Result<()> {
//!     let config = Config::load()?;
//!     let captioner = Captioner::load(&config)?;
//!
//!     let bytes = std::fs::read("./image.jpg")?;
//!     println!("{}", captioner.generate_caption(&bytes)?);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod math;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use decoder::{
    BeamSearchDecoder, Caption, CaptionModel, DecodeOptions, ScoreMode, TokenId, Vocabulary,
};
pub use encoder::{FeatureExtractor, ImageEmbedding, InceptionEncoder};
pub use error::{CaptionError, ConfigError, PipelineError, PipelineResult, Result};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{Captioner, ImageDiscovery};
pub use types::{CaptionRecord, ProcessingStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
