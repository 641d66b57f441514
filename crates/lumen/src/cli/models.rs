//! The `lumen models` command for inspecting model files.
//!
//! Lumen needs three files in the model directory: the feature extractor,
//! the caption model (both ONNX), and the vocabulary they were trained with.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use lumen_core::{Config, Vocabulary};

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// List required model files and whether they are present
    List,

    /// Show model directory path
    Path,
}

/// One required file and its status on disk.
pub struct ModelFile {
    pub label: &'static str,
    pub path: PathBuf,
    /// Size in bytes, `None` when missing
    pub size: Option<u64>,
}

impl ModelFile {
    fn new(label: &'static str, path: PathBuf) -> Self {
        let size = std::fs::metadata(&path)
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.len());
        Self { label, path, size }
    }

    pub fn exists(&self) -> bool {
        self.size.is_some()
    }
}

/// Check which of the required files are present.
pub fn check_installed(config: &Config) -> Vec<ModelFile> {
    vec![
        ModelFile::new("Feature extractor", config.encoder_path()),
        ModelFile::new("Caption model", config.decoder_path()),
        ModelFile::new("Vocabulary", config.vocabulary_path()),
    ]
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs) -> anyhow::Result<()> {
    let config = Config::load()?;

    match args.command {
        ModelsCommand::List => {
            let files = check_installed(&config);
            println!("Model directory: {}\n", config.model_dir().display());

            for file in &files {
                match file.size {
                    Some(size) => println!(
                        "  [ok]      {:<18} {} ({:.1} MB)",
                        file.label,
                        file.path.display(),
                        size as f64 / (1024.0 * 1024.0)
                    ),
                    None => println!("  [missing] {:<18} {}", file.label, file.path.display()),
                }
            }

            // A vocabulary that parses but lacks start/end tokens fails at caption time.
            if files[2].exists() {
                match Vocabulary::load(&files[2].path, &config.vocabulary) {
                    Ok(vocabulary) => println!(
                        "\n  Vocabulary: {} tokens (start={}, end={})",
                        vocabulary.len(),
                        vocabulary.start(),
                        vocabulary.end()
                    ),
                    Err(e) => println!("\n  Vocabulary is unusable: {e}"),
                }
            }

            if files.iter().all(ModelFile::exists) {
                println!("\nReady to caption.");
            } else {
                println!(
                    "\nMissing files. Place them in the model directory or point \
                     `general.model_dir` at them (see `lumen config path`)."
                );
            }
        }

        ModelsCommand::Path => {
            println!("{}", config.model_dir().display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_installed_reports_present_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.general.model_dir = dir.path().to_path_buf();
        std::fs::write(config.vocabulary_path(), r#"{"start": 1, "end": 2}"#).unwrap();

        let files = check_installed(&config);
        assert_eq!(files.len(), 3);
        assert!(!files[0].exists());
        assert!(!files[1].exists());
        assert!(files[2].exists());
        assert_eq!(files[2].size, Some(22));
    }
}
