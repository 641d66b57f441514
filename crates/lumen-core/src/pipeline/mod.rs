//! Image captioning pipeline components.
//!
//! - **validate**: size and magic-byte checks on raw payloads
//! - **decode**: decode bytes with content-based format detection
//! - **preprocessor**: validate + decode + normalize into a tensor
//! - **hash**: BLAKE3 content hashes for output records
//! - **discovery**: find image files in directories
//! - **captioner**: composes the stages with feature extraction and decoding

pub mod captioner;
pub mod decode;
pub mod discovery;
pub mod hash;
pub mod preprocessor;
pub mod validate;

// Re-exports for convenient access
pub use captioner::Captioner;
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::ImageDiscovery;
pub use hash::content_hash;
pub use preprocessor::{PreparedImage, Preprocessor};
pub use validate::Validator;
