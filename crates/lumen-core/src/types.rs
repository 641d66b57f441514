//! Core data types emitted by the captioning pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The output record for one captioned image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionRecord {
    // === File Identification ===
    /// Path to the source file
    pub file_path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    /// BLAKE3 hash of the file contents
    pub content_hash: String,

    // === Image Properties ===
    /// Original image width in pixels
    pub width: u32,

    /// Original image height in pixels
    pub height: u32,

    /// Detected format ("jpeg", "png", "webp", etc.)
    pub format: String,

    // === Caption ===
    /// Rendered caption (may be empty)
    pub caption: String,

    /// Cumulative beam search score of the caption
    pub score: f64,

    /// Wall-clock time spent captioning, in milliseconds
    pub latency_ms: u64,
}

/// Upper-case the first character of a caption and lower-case the rest.
pub fn capitalize(caption: &str) -> String {
    let mut chars = caption.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Processing statistics for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProcessingStats {
    /// Images captioned successfully
    pub succeeded: usize,

    /// Images rejected as bad input (undecodable, oversized)
    pub rejected: usize,

    /// Images that failed on the server side (inference, timeout)
    pub failed: usize,

    /// Captioning rate in images per second
    pub images_per_second: f64,

    /// Total processing time in seconds
    pub total_seconds: f64,
}

impl ProcessingStats {
    /// Total number of images attempted.
    pub fn attempted(&self) -> usize {
        self.succeeded + self.rejected + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("a dog runs"), "A dog runs");
        assert_eq!(capitalize("A dog"), "A dog");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("éclair"), "Éclair");
        assert_eq!(capitalize("a Dog on THE beach"), "A dog on the beach");
    }

    #[test]
    fn test_caption_record_serializes_fields() {
        let record = CaptionRecord {
            file_path: PathBuf::from("/photos/beach.jpg"),
            file_name: "beach.jpg".to_string(),
            content_hash: "abc123".to_string(),
            width: 1920,
            height: 1080,
            format: "jpeg".to_string(),
            caption: "A dog runs on the beach".to_string(),
            score: -3.25,
            latency_ms: 410,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"content_hash\":\"abc123\""));
        assert!(json.contains("\"caption\":\"A dog runs on the beach\""));
        assert!(json.contains("\"latency_ms\":410"));
    }

    #[test]
    fn test_stats_attempted() {
        let stats = ProcessingStats {
            succeeded: 3,
            rejected: 1,
            failed: 2,
            ..Default::default()
        };
        assert_eq!(stats.attempted(), 6);
    }
}
