//! File discovery for finding images in directories.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::ProcessingConfig;

/// Discovers image files to caption.
pub struct ImageDiscovery {
    supported_formats: Vec<String>,
}

impl ImageDiscovery {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            supported_formats: config
                .supported_formats
                .iter()
                .map(|f| f.to_lowercase())
                .collect(),
        }
    }

    /// Discover all supported image files at a path.
    ///
    /// A file path is returned as-is, whatever its extension, so callers get a
    /// decode error rather than silence. A directory is walked recursively.
    /// Results are sorted for deterministic ordering.
    pub fn discover(&self, path: &Path) -> std::io::Result<Vec<PathBuf>> {
        let metadata = std::fs::metadata(path)?;
        if metadata.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.is_supported(e.path()))
            .map(|e| e.into_path())
            .collect();

        files.sort();
        Ok(files)
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.supported_formats.iter().any(|fmt| *fmt == ext)
            })
            .unwrap_or(false)
    }
}
